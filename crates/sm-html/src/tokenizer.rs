//! Byte-level HTML tokenizer.

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    Start {
        name: String,
        attrs: Vec<(String, String)>,
        self_closing: bool,
    },
    End {
        name: String,
    },
    /// Character data, entity-decoded unless it came from a raw-text element.
    Text(String),
}

pub(crate) fn tokenize(source: &str) -> Vec<Token> {
    let mut tokenizer = Tokenizer {
        source,
        bytes: source.as_bytes(),
        pos: 0,
        tokens: Vec::new(),
    };
    tokenizer.run();
    tokenizer.tokens
}

struct Tokenizer<'a> {
    source: &'a str,
    bytes: &'a [u8],
    pos: usize,
    tokens: Vec<Token>,
}

impl<'a> Tokenizer<'a> {
    fn run(&mut self) {
        while self.pos < self.bytes.len() {
            if self.at(b"<!--") {
                self.pos = self
                    .find_from(self.pos + 4, "-->")
                    .map_or(self.bytes.len(), |end| end + 3);
                continue;
            }
            if self.at(b"<!") || self.at(b"<?") {
                self.pos = self
                    .find_from(self.pos + 2, ">")
                    .map_or(self.bytes.len(), |end| end + 1);
                continue;
            }

            let consumed = if self.at(b"</") {
                self.end_tag()
            } else if self.at(b"<") {
                self.start_tag()
            } else {
                false
            };
            if !consumed {
                self.text();
            }
        }
    }

    fn at(&self, prefix: &[u8]) -> bool {
        self.bytes[self.pos..].starts_with(prefix)
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn find_from(&self, from: usize, needle: &str) -> Option<usize> {
        let from = from.min(self.bytes.len());
        self.source[from..].find(needle).map(|offset| from + offset)
    }

    /// Advances over bytes matching `accept` and returns them.
    fn take_while(&mut self, accept: impl Fn(u8) -> bool) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(&accept) {
            self.pos += 1;
        }
        &self.source[start..self.pos]
    }

    fn skip_whitespace(&mut self) {
        self.take_while(|byte| byte.is_ascii_whitespace());
    }

    /// Character data up to the next `<`. A `<` that opened nothing is
    /// literal text.
    fn text(&mut self) {
        let start = self.pos;
        self.pos += 1;
        self.take_while(|byte| byte != b'<');
        self.tokens
            .push(Token::Text(decode_entities(&self.source[start..self.pos])));
    }

    /// Returns false, consuming nothing, when this is not a well-formed end tag.
    fn end_tag(&mut self) -> bool {
        let start = self.pos;
        self.pos += 2;
        self.skip_whitespace();
        let name = self.take_while(is_name_char);
        let close = self.find_from(self.pos, ">");
        match close {
            Some(close) if !name.is_empty() => {
                self.tokens.push(Token::End {
                    name: name.to_ascii_lowercase(),
                });
                self.pos = close + 1;
                true
            }
            _ => {
                self.pos = start;
                false
            }
        }
    }

    fn start_tag(&mut self) -> bool {
        let start = self.pos;
        self.pos += 1;
        let name = self.take_while(is_name_char).to_ascii_lowercase();
        if name.is_empty() {
            self.pos = start;
            return false;
        }

        let Some((attrs, self_closing)) = self.attributes() else {
            self.pos = start;
            return false;
        };

        let raw_text = !self_closing && matches!(name.as_str(), "script" | "style");
        self.tokens.push(Token::Start {
            name: name.clone(),
            attrs,
            self_closing,
        });
        if raw_text {
            self.raw_text(name);
        }
        true
    }

    /// Attributes up to the closing `>`; `None` when the input ends first.
    fn attributes(&mut self) -> Option<(Vec<(String, String)>, bool)> {
        let mut attrs: Vec<(String, String)> = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek()? {
                b'>' => {
                    self.pos += 1;
                    return Some((attrs, false));
                }
                b'/' => {
                    self.pos += 1;
                    self.skip_whitespace();
                    if self.peek() == Some(b'>') {
                        self.pos += 1;
                        return Some((attrs, true));
                    }
                }
                _ => {
                    let name = self.take_while(is_attr_name_char).to_ascii_lowercase();
                    if name.is_empty() {
                        self.pos += 1;
                        continue;
                    }
                    let value = self.attribute_value();
                    // First occurrence wins for duplicated attributes.
                    if !attrs.iter().any(|(existing, _)| *existing == name) {
                        attrs.push((name, decode_entities(value)));
                    }
                }
            }
        }
    }

    fn attribute_value(&mut self) -> &'a str {
        self.skip_whitespace();
        if self.peek() != Some(b'=') {
            return "";
        }
        self.pos += 1;
        self.skip_whitespace();

        match self.peek() {
            Some(quote @ (b'"' | b'\'')) => {
                self.pos += 1;
                let value = self.take_while(|byte| byte != quote);
                if self.peek().is_some() {
                    self.pos += 1;
                }
                value
            }
            _ => self.take_while(|byte| !byte.is_ascii_whitespace() && byte != b'>'),
        }
    }

    /// Script and style content runs verbatim to the matching end tag, which
    /// is implied at end of input.
    fn raw_text(&mut self, name: String) {
        let start = self.pos;
        let mut search = start;
        let (text_end, resume) = loop {
            let Some(lt) = self.find_from(search, "</") else {
                break (self.bytes.len(), self.bytes.len());
            };
            let name_end = lt + 2 + name.len();
            let names_match = self
                .bytes
                .get(lt + 2..name_end)
                .is_some_and(|candidate| candidate.eq_ignore_ascii_case(name.as_bytes()));
            if names_match {
                self.pos = name_end;
                self.skip_whitespace();
                if self.peek() == Some(b'>') {
                    break (lt, self.pos + 1);
                }
            }
            search = lt + 2;
        };

        if text_end > start {
            self.tokens
                .push(Token::Text(self.source[start..text_end].to_owned()));
        }
        self.tokens.push(Token::End { name });
        self.pos = resume;
    }
}

pub(crate) fn decode_entities(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut cursor = 0_usize;

    while let Some(rel_amp) = input[cursor..].find('&') {
        let amp = cursor + rel_amp;
        out.push_str(&input[cursor..amp]);

        let rest = &input[(amp + 1)..];
        let decoded = rest
            .find(';')
            .filter(|rel_semi| *rel_semi <= 10)
            .and_then(|rel_semi| decode_entity(&rest[..rel_semi]).map(|text| (text, rel_semi)));

        match decoded {
            Some((text, rel_semi)) => {
                out.push_str(&text);
                cursor = amp + 1 + rel_semi + 1;
            }
            None => {
                out.push('&');
                cursor = amp + 1;
            }
        }
    }

    out.push_str(&input[cursor..]);
    out
}

fn decode_entity(entity: &str) -> Option<String> {
    match entity {
        "nbsp" => Some("\u{a0}".to_owned()),
        "amp" => Some("&".to_owned()),
        "lt" => Some("<".to_owned()),
        "gt" => Some(">".to_owned()),
        "quot" => Some("\"".to_owned()),
        "apos" => Some("'".to_owned()),
        "laquo" => Some("\u{ab}".to_owned()),
        "raquo" => Some("\u{bb}".to_owned()),
        "ndash" => Some("\u{2013}".to_owned()),
        "mdash" => Some("\u{2014}".to_owned()),
        _ => {
            let value = if let Some(hex) = entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                entity.strip_prefix('#')?.parse::<u32>().ok()?
            };
            char::from_u32(value).map(|ch| ch.to_string())
        }
    }
}

fn is_name_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b':')
}

fn is_attr_name_char(b: u8) -> bool {
    !b.is_ascii_whitespace() && !matches!(b, b'>' | b'/' | b'=' | b'"' | b'\'')
}
