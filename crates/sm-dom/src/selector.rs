//! Selector parsing for `querySelectorAll`-style lookups and stylesheet rules.

use sm_core::ScrollmarkError;
use sm_core::ScrollmarkResult;

/// Parsed selector list (`a, b > .c`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    complexes: Vec<ComplexSelector>,
}

/// Selector specificity, compared lexicographically.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Specificity {
    pub ids: u32,
    pub classes: u32,
    pub tags: u32,
}

/// Compound selectors stored subject-first; each segment names how it
/// relates to the segment after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ComplexSelector {
    pub(crate) segments: Vec<SelectorSegment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SelectorSegment {
    pub(crate) simple: SimpleSelector,
    pub(crate) combinator_to_next: Option<Combinator>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct SimpleSelector {
    pub(crate) tag: Option<String>,
    pub(crate) id: Option<String>,
    pub(crate) classes: Vec<String>,
    pub(crate) attributes: Vec<AttributeRequirement>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AttributeRequirement {
    pub(crate) name: String,
    pub(crate) value: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Combinator {
    Descendant,
    Child,
}

impl Selector {
    pub fn parse(input: &str) -> ScrollmarkResult<Self> {
        let mut cursor = Cursor::new(input);
        let mut complexes = Vec::new();

        loop {
            cursor.skip_whitespace();
            complexes.push(
                parse_complex(&mut cursor).ok_or_else(|| invalid_selector(input))?,
            );
            cursor.skip_whitespace();
            match cursor.peek() {
                None => break,
                Some(',') => cursor.advance(),
                Some(_) => return Err(invalid_selector(input)),
            }
        }

        Ok(Self {
            source: input.trim().to_owned(),
            complexes,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Highest specificity among the listed selectors.
    pub fn specificity(&self) -> Specificity {
        self.complexes
            .iter()
            .map(ComplexSelector::specificity)
            .max()
            .unwrap_or_default()
    }

    pub(crate) fn complexes(&self) -> &[ComplexSelector] {
        &self.complexes
    }
}

impl ComplexSelector {
    fn specificity(&self) -> Specificity {
        self.segments
            .iter()
            .fold(Specificity::default(), |acc, segment| {
                let simple = &segment.simple;
                Specificity {
                    ids: acc.ids + u32::from(simple.id.is_some()),
                    classes: acc.classes
                        + simple.classes.len() as u32
                        + simple.attributes.len() as u32,
                    tags: acc.tags + u32::from(simple.tag.is_some()),
                }
            })
    }
}

fn invalid_selector(input: &str) -> ScrollmarkError {
    ScrollmarkError::new(
        "dom.selector.invalid",
        format!("`{input}` is not a valid selector"),
    )
}

fn parse_complex(cursor: &mut Cursor) -> Option<ComplexSelector> {
    let mut compounds = vec![parse_compound(cursor)?];
    let mut combinators = Vec::new();

    loop {
        let had_whitespace = cursor.skip_whitespace();
        match cursor.peek() {
            None | Some(',') => break,
            Some('>') => {
                cursor.advance();
                cursor.skip_whitespace();
                combinators.push(Combinator::Child);
            }
            Some(_) if had_whitespace => combinators.push(Combinator::Descendant),
            Some(_) => return None,
        }
        compounds.push(parse_compound(cursor)?);
    }

    let mut segments = Vec::with_capacity(compounds.len());
    while let Some(simple) = compounds.pop() {
        segments.push(SelectorSegment {
            simple,
            combinator_to_next: combinators.pop(),
        });
    }

    Some(ComplexSelector { segments })
}

fn parse_compound(cursor: &mut Cursor) -> Option<SimpleSelector> {
    let mut simple = SimpleSelector::default();
    let mut consumed = false;

    match cursor.peek() {
        Some('*') => {
            cursor.advance();
            consumed = true;
        }
        Some(ch) if is_ident_char(ch) => {
            simple.tag = Some(parse_ident(cursor)?.to_ascii_lowercase());
            consumed = true;
        }
        _ => {}
    }

    loop {
        match cursor.peek() {
            Some('#') => {
                cursor.advance();
                simple.id = Some(parse_ident(cursor)?);
            }
            Some('.') => {
                cursor.advance();
                simple.classes.push(parse_ident(cursor)?);
            }
            Some('[') => {
                cursor.advance();
                simple.attributes.push(parse_attribute(cursor)?);
            }
            _ => break,
        }
        consumed = true;
    }

    consumed.then_some(simple)
}

fn parse_attribute(cursor: &mut Cursor) -> Option<AttributeRequirement> {
    cursor.skip_whitespace();
    let name = parse_ident(cursor)?.to_ascii_lowercase();
    cursor.skip_whitespace();

    let value = match cursor.peek()? {
        ']' => None,
        '=' => {
            cursor.advance();
            cursor.skip_whitespace();
            let value = match cursor.peek()? {
                quote @ ('"' | '\'') => {
                    cursor.advance();
                    parse_quoted(cursor, quote)?
                }
                _ => parse_ident(cursor)?,
            };
            cursor.skip_whitespace();
            Some(value)
        }
        _ => return None,
    };

    if cursor.peek()? != ']' {
        return None;
    }
    cursor.advance();
    Some(AttributeRequirement { name, value })
}

fn parse_quoted(cursor: &mut Cursor, quote: char) -> Option<String> {
    let mut out = String::new();
    loop {
        let ch = cursor.peek()?;
        cursor.advance();
        match ch {
            '\\' => {
                out.push(cursor.peek()?);
                cursor.advance();
            }
            _ if ch == quote => return Some(out),
            _ => out.push(ch),
        }
    }
}

fn parse_ident(cursor: &mut Cursor) -> Option<String> {
    let mut out = String::new();
    while let Some(ch) = cursor.peek() {
        if ch == '\\' {
            cursor.advance();
            out.push(cursor.peek()?);
            cursor.advance();
            continue;
        }
        if !is_ident_char(ch) {
            break;
        }
        out.push(ch);
        cursor.advance();
    }

    (!out.is_empty()).then_some(out)
}

fn is_ident_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_') || !ch.is_ascii()
}

struct Cursor {
    chars: Vec<char>,
    idx: usize,
}

impl Cursor {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            idx: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.idx).copied()
    }

    fn advance(&mut self) {
        self.idx = self.idx.saturating_add(1);
    }

    /// Returns whether any whitespace was consumed.
    fn skip_whitespace(&mut self) -> bool {
        let start = self.idx;
        while self.peek().is_some_and(char::is_whitespace) {
            self.advance();
        }
        self.idx != start
    }
}
