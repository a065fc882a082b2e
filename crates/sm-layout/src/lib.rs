//! Layout engine entry points (style resolution + box tree).
//!
//! This is a block-flow estimator, not a text shaper: inline content is
//! measured with a fixed average glyph advance and wrapped into lines of a
//! fixed height. It is precise enough to place scroll targets.

use sm_core::Rect;
use sm_css::Length;
use sm_css::LengthContext;
use sm_css::StyleSheet;
use sm_dom::Document;
use sm_dom::NodeId;
use sm_dom::NodeKind;
use std::collections::HashMap;

/// Viewport and text metrics used during layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    pub viewport_width: f64,
    pub viewport_height: f64,
    pub line_height: f64,
    /// Average horizontal advance of one character.
    pub char_width: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            viewport_width: 1024.0,
            viewport_height: 768.0,
            line_height: 24.0,
            char_width: 8.0,
        }
    }
}

/// Border boxes of laid-out elements in document coordinates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutTree {
    boxes: HashMap<NodeId, Rect>,
    content_height: f64,
}

impl LayoutTree {
    pub fn bounding_rect(&self, node: NodeId) -> Option<Rect> {
        self.boxes.get(&node).copied()
    }

    pub fn box_count(&self) -> usize {
        self.boxes.len()
    }

    pub fn content_height(&self) -> f64 {
        self.content_height
    }

    /// Largest vertical scroll offset for a viewport of the given height.
    pub fn max_scroll(&self, viewport_height: f64) -> f64 {
        (self.content_height - viewport_height).max(0.0)
    }
}

/// Computes visual layout from DOM and styles.
#[derive(Debug, Default)]
pub struct LayoutEngine {
    config: LayoutConfig,
}

struct Pass<'a> {
    document: &'a Document,
    stylesheet: &'a StyleSheet,
    config: LayoutConfig,
    boxes: HashMap<NodeId, Rect>,
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn compute(&self, document: &Document, stylesheet: &StyleSheet) -> LayoutTree {
        let mut pass = Pass {
            document,
            stylesheet,
            config: self.config,
            boxes: HashMap::new(),
        };

        let content_height =
            pass.layout_children(Document::ROOT, 0.0, 0.0, self.config.viewport_width);

        LayoutTree {
            boxes: pass.boxes,
            content_height,
        }
    }
}

impl Pass<'_> {
    /// Lays out the children of `parent` starting at `y`; returns the height
    /// they occupy.
    fn layout_children(&mut self, parent: NodeId, x: f64, y: f64, width: f64) -> f64 {
        let mut cursor = y;
        let mut inline_run: Vec<NodeId> = Vec::new();

        for &child in self.document.children(parent) {
            if self.is_skipped(child) {
                continue;
            }

            if self.is_block(child) {
                cursor += self.flush_inline_run(&mut inline_run, parent, x, cursor, width);
                cursor += self.layout_block(child, x, cursor, width);
            } else {
                inline_run.push(child);
            }
        }

        cursor += self.flush_inline_run(&mut inline_run, parent, x, cursor, width);
        cursor - y
    }

    /// Returns the outer (margin-box) height.
    fn layout_block(&mut self, node: NodeId, x: f64, y: f64, width: f64) -> f64 {
        let context = LengthContext {
            viewport_width: self.config.viewport_width,
            viewport_height: self.config.viewport_height,
            containing_block: width,
        };
        let edge = |pass: &Self, property: &str| {
            pass.stylesheet
                .declared_length(pass.document, node, property)
                .and_then(|length| length.resolve(&context))
        };

        let ua_margin = self.ua_vertical_margin(node);
        let margin_top = edge(self, "margin-top").unwrap_or(ua_margin);
        let margin_bottom = edge(self, "margin-bottom").unwrap_or(ua_margin);
        let padding_top = edge(self, "padding-top").unwrap_or(0.0).max(0.0);
        let padding_bottom = edge(self, "padding-bottom").unwrap_or(0.0).max(0.0);
        let margin_left = edge(self, "margin-left").unwrap_or(0.0);
        let margin_right = edge(self, "margin-right").unwrap_or(0.0);
        let padding_left = edge(self, "padding-left").unwrap_or(0.0).max(0.0);
        let padding_right = edge(self, "padding-right").unwrap_or(0.0).max(0.0);

        let box_x = x + margin_left;
        let box_width = (width - margin_left - margin_right).max(0.0);
        let content_x = box_x + padding_left;
        let content_width = (box_width - padding_left - padding_right).max(0.0);

        let top = y + margin_top;
        let flowed =
            self.layout_children(node, content_x, top + padding_top, content_width);

        let explicit = self.vertical_size(node, "height", &context);
        let minimum = self.vertical_size(node, "min-height", &context).unwrap_or(0.0);
        let content_height = explicit.unwrap_or(flowed).max(minimum);
        let border_height = padding_top + content_height + padding_bottom;

        self.boxes
            .insert(node, Rect::new(box_x, top, box_width, border_height));
        margin_top + border_height + margin_bottom
    }

    /// Percentages need a definite containing-block height, which block flow
    /// does not have, so they resolve to `auto`.
    fn vertical_size(&self, node: NodeId, property: &str, context: &LengthContext) -> Option<f64> {
        match self.stylesheet.declared_length(self.document, node, property)? {
            Length::Percent(_) => None,
            length => length.resolve(context),
        }
    }

    fn flush_inline_run(
        &mut self,
        run: &mut Vec<NodeId>,
        parent: NodeId,
        x: f64,
        y: f64,
        width: f64,
    ) -> f64 {
        if run.is_empty() {
            return 0.0;
        }

        let text = run
            .iter()
            .map(|node| self.visible_text(*node))
            .collect::<Vec<_>>()
            .join("");
        let chars = text.split_whitespace().collect::<Vec<_>>().join(" ").chars().count();

        let scale = self.font_scale(parent);
        let height = if chars == 0 {
            0.0
        } else {
            let advance = self.config.char_width * scale;
            let per_line = (width / advance).floor().max(1.0);
            (chars as f64 / per_line).ceil() * self.config.line_height * scale
        };

        let area = Rect::new(x, y, width, height);
        for node in run.drain(..) {
            if self.document.is_element(node) {
                self.boxes.insert(node, area);
                for descendant in self.document.descendants(node) {
                    if self.document.is_element(descendant) {
                        self.boxes.insert(descendant, area);
                    }
                }
            }
        }

        height
    }

    fn visible_text(&self, node: NodeId) -> String {
        match self.document.kind(node) {
            Some(NodeKind::Text(text)) => text.clone(),
            Some(NodeKind::Element(_)) if !self.is_skipped(node) => self
                .document
                .children(node)
                .iter()
                .map(|child| self.visible_text(*child))
                .collect(),
            _ => String::new(),
        }
    }

    fn is_skipped(&self, node: NodeId) -> bool {
        let Some(tag) = self.document.tag_name(node) else {
            return false;
        };
        matches!(
            tag,
            "head" | "title" | "meta" | "link" | "script" | "style" | "template" | "noscript"
        ) || self.stylesheet.is_display_none(self.document, node)
    }

    fn is_block(&self, node: NodeId) -> bool {
        let Some(tag) = self.document.tag_name(node) else {
            return false;
        };

        match self.stylesheet.declared_value(self.document, node, "display") {
            Some(display) if display.starts_with("inline") => false,
            Some("block" | "flex" | "grid" | "list-item" | "table") => true,
            _ => is_block_tag(tag),
        }
    }

    fn font_scale(&self, node: NodeId) -> f64 {
        match self.document.tag_name(node) {
            Some("h1") => 2.0,
            Some("h2") => 1.5,
            Some("h3") => 1.17,
            _ => 1.0,
        }
    }

    fn ua_vertical_margin(&self, node: NodeId) -> f64 {
        let em = sm_css::BASE_FONT_SIZE;
        match self.document.tag_name(node) {
            Some("p" | "ul" | "ol" | "blockquote") => em,
            Some("h1") => 0.67 * 2.0 * em,
            Some("h2") => 0.83 * 1.5 * em,
            Some("h3") => 1.17 * em,
            _ => 0.0,
        }
    }
}

fn is_block_tag(tag: &str) -> bool {
    matches!(
        tag,
        "html"
            | "body"
            | "main"
            | "section"
            | "article"
            | "header"
            | "footer"
            | "nav"
            | "aside"
            | "div"
            | "p"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "ul"
            | "ol"
            | "li"
            | "blockquote"
            | "pre"
            | "table"
            | "form"
            | "hr"
            | "figure"
    )
}
