//! HTML tokenization and parsing boundaries.

mod decode;
mod tokenizer;

pub use decode::decode_html_bytes;

use sm_dom::Document;
use sm_dom::Location;
use sm_dom::NodeId;
use tokenizer::Token;
use tokenizer::tokenize;

/// Parses raw HTML into a DOM document.
#[derive(Debug, Default)]
pub struct HtmlParser;

impl HtmlParser {
    /// Parses `input` into a document located at `about:blank`.
    pub fn parse(&self, input: &str) -> Document {
        self.parse_at(input, Location::blank())
    }

    pub fn parse_at(&self, input: &str, location: Location) -> Document {
        let mut document = Document::with_location(location);
        build_tree(&mut document, tokenize(input));
        document
    }

    /// Decodes `bytes` (see [`decode_html_bytes`]) before parsing.
    pub fn parse_bytes(&self, bytes: &[u8], content_type: &str, location: Location) -> Document {
        let decoded = decode_html_bytes(bytes, content_type);
        self.parse_at(&decoded, location)
    }

    /// Concatenated text of every inline `<style>` element.
    pub fn stylesheet_source(&self, document: &Document) -> String {
        document
            .elements()
            .into_iter()
            .filter(|node| document.tag_name(*node) == Some("style"))
            .map(|node| document.text_content(node))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn build_tree(document: &mut Document, tokens: Vec<Token>) {
    let mut stack: Vec<(NodeId, String)> = Vec::new();

    for token in tokens {
        let parent = stack.last().map(|(node, _)| *node).unwrap_or(Document::ROOT);
        match token {
            Token::Text(text) => {
                document.append_text(parent, &text);
            }
            Token::Start {
                name,
                attrs,
                self_closing,
            } => {
                let node = document.append_element(parent, &name, attrs);
                if !self_closing && !is_void(&name) {
                    stack.push((node, name));
                }
            }
            Token::End { name } => {
                // Stray end tags are ignored; otherwise everything opened
                // after the matching start tag is closed with it.
                if let Some(position) = stack.iter().rposition(|(_, open)| *open == name) {
                    stack.truncate(position);
                }
            }
        }
    }
}

fn is_void(tag: &str) -> bool {
    matches!(
        tag,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

#[cfg(test)]
mod tests {
    use super::HtmlParser;
    use sm_dom::Document;
    use sm_dom::NodeKind;

    #[test]
    fn parses_title_and_root() {
        let parser = HtmlParser;
        let doc =
            parser.parse("<html><head><title> Pixel   Cards </title></head><body>Hi</body></html>");
        assert_eq!(doc.title(), "Pixel Cards");
        assert!(doc.body().is_some());
        assert_eq!(doc.children(Document::ROOT).len(), 1);
    }

    #[test]
    fn builds_cards_and_toc_entries() {
        let parser = HtmlParser;
        let doc = parser.parse(
            r##"<nav class="toc"><a class="toc-article" href="#0">Intro</a><a class=toc-article href='#1'>One</a></nav>
            <div class="container"><div id="0" class="card title-card"><h1>Intro</h1></div><div id="1" class="card">One</div></div>"##,
        );

        let cards = doc.query_selector_all(".card").unwrap_or_default();
        assert_eq!(cards.len(), 2);
        assert_eq!(doc.element_id(cards[0]), Some("0"));
        assert!(doc.has_class(cards[0], "title-card"));

        let entries = doc.query_selector_all(".toc-article").unwrap_or_default();
        let hrefs: Vec<_> = entries
            .iter()
            .filter_map(|node| doc.attribute(*node, "href"))
            .collect();
        assert_eq!(hrefs, vec!["#0", "#1"]);
    }

    #[test]
    fn void_and_self_closing_elements_do_not_swallow_siblings() {
        let parser = HtmlParser;
        let doc = parser.parse(
            "<p><input class=\"translate-toggle\" type=\"checkbox\"><label for=\"x\">a</label><br/>b</p>",
        );
        let Ok(Some(p)) = doc.query_selector("p") else {
            panic!("paragraph missing");
        };
        let child_tags: Vec<_> = doc
            .children(p)
            .iter()
            .map(|node| match doc.kind(*node) {
                Some(NodeKind::Element(data)) => data.tag.clone(),
                Some(NodeKind::Text(text)) => format!("#text:{text}"),
                _ => String::new(),
            })
            .collect();
        assert_eq!(child_tags, vec!["input", "label", "br", "#text:b"]);
    }

    #[test]
    fn keeps_raw_text_of_style_and_script() {
        let parser = HtmlParser;
        let doc = parser.parse(
            "<head><style>.card > p { margin: 0 }</style><script>if (a < b) {}</script></head>",
        );
        assert_eq!(parser.stylesheet_source(&doc), ".card > p { margin: 0 }");
        let Ok(Some(script)) = doc.query_selector("script") else {
            panic!("script missing");
        };
        assert_eq!(doc.text_content(script), "if (a < b) {}");
    }

    #[test]
    fn ignores_stray_end_tags_and_closes_unclosed_elements() {
        let parser = HtmlParser;
        let doc = parser.parse("<div id=\"a\"></span><div id=\"b\">text");
        let Some(outer) = doc.get_element_by_id("a") else {
            panic!("outer div missing");
        };
        let Some(inner) = doc.get_element_by_id("b") else {
            panic!("inner div missing");
        };
        assert_eq!(doc.parent(inner), Some(outer));
        assert_eq!(doc.text_content(outer), "text");
    }

    #[test]
    fn decodes_entities_in_text_and_attributes() {
        let parser = HtmlParser;
        let doc = parser.parse("<a href=\"#1&amp;2\" title=\"&quot;x&quot;\">&lt;b&gt; &#x41;&#66;</a>");
        let Ok(Some(link)) = doc.query_selector("a") else {
            panic!("link missing");
        };
        assert_eq!(doc.attribute(link, "href"), Some("#1&2"));
        assert_eq!(doc.attribute(link, "title"), Some("\"x\""));
        assert_eq!(doc.text_content(link), "<b> AB");
    }
}
