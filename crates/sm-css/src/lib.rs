//! CSS tokenization and stylesheet model.

mod length;
mod scan;

pub use length::BASE_FONT_SIZE;
pub use length::Length;
pub use length::LengthContext;

use sm_dom::Document;
use sm_dom::NodeId;
use sm_dom::Selector;
use sm_dom::Specificity;

/// One `property: value` pair; shorthands are expanded at parse time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub name: String,
    pub value: String,
    pub important: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleRule {
    pub selector: Selector,
    pub declarations: Vec<Declaration>,
}

/// Style rules compiled from source CSS, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleSheet {
    pub rules: Vec<StyleRule>,
}

impl StyleSheet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    pub fn extend(&mut self, other: StyleSheet) {
        self.rules.extend(other.rules);
    }

    /// Cascaded value of `property` on `node`: `!important` first, then
    /// specificity, then the later rule.
    pub fn declared_value(&self, document: &Document, node: NodeId, property: &str) -> Option<&str> {
        let mut winner: Option<((bool, Specificity, usize), &str)> = None;

        for (order, rule) in self.rules.iter().enumerate() {
            let Some(declaration) = rule
                .declarations
                .iter()
                .rev()
                .find(|declaration| declaration.name == property)
            else {
                continue;
            };
            if !document.matches(node, &rule.selector) {
                continue;
            }

            let rank = (declaration.important, rule.selector.specificity(), order);
            if winner.as_ref().is_none_or(|(best, _)| rank >= *best) {
                winner = Some((rank, declaration.value.as_str()));
            }
        }

        winner.map(|(_, value)| value)
    }

    pub fn declared_length(&self, document: &Document, node: NodeId, property: &str) -> Option<Length> {
        self.declared_value(document, node, property)
            .and_then(Length::parse)
    }

    pub fn is_display_none(&self, document: &Document, node: NodeId) -> bool {
        self.declared_value(document, node, "display")
            .is_some_and(|value| value.eq_ignore_ascii_case("none"))
    }
}

/// Parses CSS source text.
#[derive(Debug, Default)]
pub struct CssParser;

impl CssParser {
    pub fn parse(&self, input: &str) -> StyleSheet {
        let sanitized = scan::strip_comments(input);
        let mut rules = Vec::new();
        parse_rules_recursive(&sanitized, &mut rules);
        StyleSheet { rules }
    }
}

fn parse_rules_recursive(input: &str, out: &mut Vec<StyleRule>) {
    let mut cursor = 0_usize;

    while let Some((prelude, body, next_cursor)) = scan::next_block(input, cursor) {
        cursor = next_cursor;

        let prelude = scan::collapse_whitespace(prelude);
        if prelude.is_empty() {
            continue;
        }

        if prelude.starts_with('@') {
            if is_grouping_at_rule(&prelude) {
                parse_rules_recursive(body, out);
            }
            continue;
        }

        let declarations = parse_declarations(body);
        if declarations.is_empty() {
            continue;
        }

        match Selector::parse(&prelude) {
            Ok(selector) => out.push(StyleRule {
                selector,
                declarations,
            }),
            Err(error) => tracing::debug!(%error, "skipping style rule"),
        }
    }
}

fn is_grouping_at_rule(prelude: &str) -> bool {
    let lower = prelude.to_ascii_lowercase();
    ["@media", "@supports", "@layer", "@document"]
        .iter()
        .any(|prefix| lower.starts_with(prefix))
}

fn parse_declarations(body: &str) -> Vec<Declaration> {
    let mut out = Vec::new();

    for raw in scan::split_top_level(body, b';') {
        let raw = raw.trim();
        let Some(colon) = scan::find_top_level(raw, 0, b':') else {
            continue;
        };

        let name = raw[..colon].trim().to_ascii_lowercase();
        let mut value = scan::collapse_whitespace(&raw[colon + 1..]);
        let important = strip_important(&mut value);
        if name.is_empty() || value.is_empty() {
            continue;
        }

        match name.as_str() {
            "margin" | "padding" => expand_box_shorthand(&name, &value, important, &mut out),
            _ => out.push(Declaration {
                name,
                value,
                important,
            }),
        }
    }

    out
}

fn strip_important(value: &mut String) -> bool {
    let lower = value.to_ascii_lowercase();
    let Some(bang) = lower.rfind('!') else {
        return false;
    };
    if lower[bang + 1..].trim() != "important" {
        return false;
    }
    value.truncate(bang);
    let trimmed = value.trim_end().len();
    value.truncate(trimmed);
    true
}

/// `margin: a [b [c [d]]]` into the four longhands.
fn expand_box_shorthand(name: &str, value: &str, important: bool, out: &mut Vec<Declaration>) {
    let parts: Vec<&str> = value.split_whitespace().collect();
    let (top, right, bottom, left) = match parts.as_slice() {
        [all] => (*all, *all, *all, *all),
        [vertical, horizontal] => (*vertical, *horizontal, *vertical, *horizontal),
        [top, horizontal, bottom] => (*top, *horizontal, *bottom, *horizontal),
        [top, right, bottom, left] => (*top, *right, *bottom, *left),
        _ => return,
    };

    for (side, side_value) in [("top", top), ("right", right), ("bottom", bottom), ("left", left)] {
        out.push(Declaration {
            name: format!("{name}-{side}"),
            value: side_value.to_owned(),
            important,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::CssParser;
    use sm_dom::Document;

    fn declaration_pairs(source: &str) -> Vec<(String, String)> {
        CssParser
            .parse(source)
            .rules
            .iter()
            .flat_map(|rule| rule.declarations.iter())
            .map(|declaration| (declaration.name.clone(), declaration.value.clone()))
            .collect()
    }

    #[test]
    fn parses_simple_rules() {
        let sheet = CssParser.parse("body { color: red; } .card { padding-top: 8px; }");
        assert_eq!(sheet.rule_count(), 2);
        assert_eq!(sheet.rules[1].selector.source(), ".card");
        assert_eq!(sheet.rules[1].declarations[0].name, "padding-top");
    }

    #[test]
    fn strips_comments_and_empty_rules() {
        let sheet = CssParser.parse("/* x */ p { font-size: 14px; } div { } [ { color: red }");
        assert_eq!(sheet.rule_count(), 1);
    }

    #[test]
    fn flattens_media_rules_and_drops_other_at_rules() {
        let sheet = CssParser.parse(
            "@font-face { font-family: x; } @media (min-width: 800px) { .card { height: 100vh; } }",
        );
        assert_eq!(sheet.rule_count(), 1);
        assert_eq!(sheet.rules[0].selector.source(), ".card");
    }

    #[test]
    fn expands_margin_shorthand() {
        let pairs = declaration_pairs(".card { margin: 10px 0 }");
        assert_eq!(
            pairs,
            vec![
                ("margin-top".to_owned(), "10px".to_owned()),
                ("margin-right".to_owned(), "0".to_owned()),
                ("margin-bottom".to_owned(), "10px".to_owned()),
                ("margin-left".to_owned(), "0".to_owned()),
            ]
        );
    }

    #[test]
    fn keeps_semicolons_inside_function_values() {
        let pairs =
            declaration_pairs(r#".icon { background-image: url("data:a;b"); color: red; }"#);
        assert_eq!(pairs[0].1, r#"url("data:a;b")"#);
        assert_eq!(pairs[1].1, "red");
    }

    #[test]
    fn cascades_by_importance_specificity_and_order() {
        let mut doc = Document::blank();
        let card = doc.append_element(
            Document::ROOT,
            "div",
            vec![
                ("id".to_owned(), "3".to_owned()),
                ("class".to_owned(), "card title-card".to_owned()),
            ],
        );
        let sheet = CssParser.parse(
            "div.card { height: 50vh } .card { height: 10px } .title-card { height: 20px } \
             .card { min-height: 1px !important } div.card { min-height: 2px }",
        );
        assert_eq!(sheet.declared_value(&doc, card, "height"), Some("50vh"));
        assert_eq!(sheet.declared_value(&doc, card, "min-height"), Some("1px"));
        assert_eq!(sheet.declared_value(&doc, card, "width"), None);
    }
}
