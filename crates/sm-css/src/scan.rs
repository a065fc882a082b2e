//! Quote- and nesting-aware scanning helpers over CSS source.

/// Tracks whether the scanner sits inside a string literal.
#[derive(Debug, Default)]
struct QuoteState {
    quote: Option<u8>,
    escape: bool,
}

impl QuoteState {
    /// Feeds one byte; returns `true` while the byte belongs to a string
    /// literal (opening and closing quotes included).
    fn feed(&mut self, byte: u8) -> bool {
        let Some(quote) = self.quote else {
            if byte == b'"' || byte == b'\'' {
                self.quote = Some(byte);
                return true;
            }
            return false;
        };

        if self.escape {
            self.escape = false;
        } else if byte == b'\\' {
            self.escape = true;
        } else if byte == quote {
            self.quote = None;
        }
        true
    }
}

/// Depth of `()` and `[]` nesting outside string literals.
#[derive(Debug, Default)]
struct Nesting {
    parens: u32,
    brackets: u32,
}

impl Nesting {
    fn feed(&mut self, byte: u8) {
        match byte {
            b'(' => self.parens = self.parens.saturating_add(1),
            b')' => self.parens = self.parens.saturating_sub(1),
            b'[' => self.brackets = self.brackets.saturating_add(1),
            b']' => self.brackets = self.brackets.saturating_sub(1),
            _ => {}
        }
    }

    fn is_top_level(&self) -> bool {
        self.parens == 0 && self.brackets == 0
    }
}

pub(crate) fn strip_comments(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut quotes = QuoteState::default();
    let mut idx = 0_usize;

    while idx < bytes.len() {
        let byte = bytes[idx];
        if quotes.feed(byte) {
            out.push(byte);
            idx = idx.saturating_add(1);
            continue;
        }

        if byte == b'/' && bytes.get(idx.saturating_add(1)) == Some(&b'*') {
            idx = find_subslice(bytes, idx.saturating_add(2), b"*/")
                .map(|end| end.saturating_add(2))
                .unwrap_or(bytes.len());
            continue;
        }

        out.push(byte);
        idx = idx.saturating_add(1);
    }

    String::from_utf8_lossy(&out).into_owned()
}

/// Next `prelude { body }` block at or after `from`, returning the cursor
/// just past the closing brace.
pub(crate) fn next_block(input: &str, from: usize) -> Option<(&str, &str, usize)> {
    let bytes = input.as_bytes();
    let start = skip_separators(bytes, from);
    if start >= bytes.len() {
        return None;
    }

    let open = find_top_level(input, start, b'{')?;
    let close = find_matching_brace(bytes, open)?;
    Some((&input[start..open], &input[open + 1..close], close + 1))
}

fn skip_separators(bytes: &[u8], mut idx: usize) -> usize {
    while idx < bytes.len() && (bytes[idx].is_ascii_whitespace() || bytes[idx] == b';') {
        idx = idx.saturating_add(1);
    }
    idx
}

fn find_matching_brace(bytes: &[u8], open: usize) -> Option<usize> {
    let mut quotes = QuoteState::default();
    let mut depth = 0_u32;

    for (idx, byte) in bytes.iter().copied().enumerate().skip(open) {
        if quotes.feed(byte) {
            continue;
        }
        match byte {
            b'{' => depth = depth.saturating_add(1),
            b'}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }

    None
}

/// Position of the first `target` byte outside strings and `()`/`[]`.
pub(crate) fn find_top_level(input: &str, from: usize, target: u8) -> Option<usize> {
    let mut quotes = QuoteState::default();
    let mut nesting = Nesting::default();

    for (idx, byte) in input.bytes().enumerate().skip(from) {
        if quotes.feed(byte) {
            continue;
        }
        if byte == target && nesting.is_top_level() {
            return Some(idx);
        }
        nesting.feed(byte);
    }

    None
}

pub(crate) fn split_top_level(input: &str, delimiter: u8) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0_usize;
    while let Some(idx) = find_top_level(input, start, delimiter) {
        parts.push(&input[start..idx]);
        start = idx.saturating_add(1);
    }
    parts.push(&input[start..]);
    parts
}

pub(crate) fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn find_subslice(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    bytes
        .get(from..)?
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|offset| from + offset)
}
