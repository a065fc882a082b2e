//! DOM tree data structures.

mod location;
mod selector;
mod surface;

pub use location::Location;
pub use selector::Selector;
pub use selector::Specificity;
pub use surface::DomSurface;

use selector::Combinator;
use selector::ComplexSelector;
use selector::SimpleSelector;
use sm_core::ScrollmarkResult;

/// ID used to address nodes in the DOM arena.
pub type NodeId = usize;

/// Element payload: lowercase tag name and attributes in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Element(ElementData),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Arena-backed document tree plus the browsing location it was loaded at.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    location: Location,
}

impl Document {
    pub const ROOT: NodeId = 0;

    pub fn new(url: &str) -> ScrollmarkResult<Self> {
        Ok(Self::with_location(Location::new(url)?))
    }

    /// Empty document at `about:blank`.
    pub fn blank() -> Self {
        Self::with_location(Location::blank())
    }

    pub fn with_location(location: Location) -> Self {
        Self {
            nodes: vec![Node {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
            }],
            location,
        }
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn location_mut(&mut self) -> &mut Location {
        &mut self.location
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn kind(&self, node: NodeId) -> Option<&NodeKind> {
        self.nodes.get(node).map(|entry| &entry.kind)
    }

    /// Creates an element under `parent`. A parent that is not a document or
    /// element node falls back to the document root.
    pub fn append_element(
        &mut self,
        parent: NodeId,
        tag: &str,
        attributes: Vec<(String, String)>,
    ) -> NodeId {
        let kind = NodeKind::Element(ElementData {
            tag: tag.to_ascii_lowercase(),
            attributes,
        });
        self.push_node(parent, kind)
    }

    /// Appends a text node, merging with a directly preceding text sibling.
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        let parent = self.container_or_root(parent);
        if let Some(&last) = self.nodes[parent].children.last()
            && let NodeKind::Text(existing) = &mut self.nodes[last].kind
        {
            existing.push_str(text);
            return last;
        }

        self.push_node(parent, NodeKind::Text(text.to_owned()))
    }

    fn push_node(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let parent = self.container_or_root(parent);
        let id = self.nodes.len();
        self.nodes.push(Node {
            kind,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent].children.push(id);
        id
    }

    fn container_or_root(&self, node: NodeId) -> NodeId {
        match self.kind(node) {
            Some(NodeKind::Document | NodeKind::Element(_)) => node,
            _ => Self::ROOT,
        }
    }

    fn element(&self, node: NodeId) -> Option<&ElementData> {
        match self.kind(node)? {
            NodeKind::Element(data) => Some(data),
            _ => None,
        }
    }

    fn element_mut(&mut self, node: NodeId) -> Option<&mut ElementData> {
        match &mut self.nodes.get_mut(node)?.kind {
            NodeKind::Element(data) => Some(data),
            _ => None,
        }
    }

    pub fn is_element(&self, node: NodeId) -> bool {
        self.element(node).is_some()
    }

    pub fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.element(node).map(|data| data.tag.as_str())
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node).and_then(|entry| entry.parent)
    }

    pub fn parent_element(&self, node: NodeId) -> Option<NodeId> {
        self.parent(node).filter(|parent| self.is_element(*parent))
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node)
            .map(|entry| entry.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node)?
            .attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Returns `false` when `node` is not an element.
    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> bool {
        let Some(data) = self.element_mut(node) else {
            return false;
        };

        let name = name.to_ascii_lowercase();
        if let Some(slot) = data.attributes.iter_mut().find(|(key, _)| *key == name) {
            slot.1 = value.to_owned();
        } else {
            data.attributes.push((name, value.to_owned()));
        }
        true
    }

    pub fn remove_attribute(&mut self, node: NodeId, name: &str) -> bool {
        let Some(data) = self.element_mut(node) else {
            return false;
        };

        let before = data.attributes.len();
        data.attributes
            .retain(|(key, _)| !key.eq_ignore_ascii_case(name));
        data.attributes.len() != before
    }

    pub fn element_id(&self, node: NodeId) -> Option<&str> {
        self.attribute(node, "id")
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.elements()
            .into_iter()
            .find(|node| self.element_id(*node) == Some(id))
    }

    /// All nodes below `node` in document (pre-)order, excluding `node`.
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(node).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    pub fn elements(&self) -> Vec<NodeId> {
        self.descendants(Self::ROOT)
            .into_iter()
            .filter(|node| self.is_element(*node))
            .collect()
    }

    pub fn first_element_by_tag(&self, tag: &str) -> Option<NodeId> {
        self.elements()
            .into_iter()
            .find(|node| self.tag_name(*node).is_some_and(|name| name.eq_ignore_ascii_case(tag)))
    }

    pub fn body(&self) -> Option<NodeId> {
        self.first_element_by_tag("body")
    }

    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        if let Some(NodeKind::Text(text)) = self.kind(node) {
            out.push_str(text);
            return out;
        }
        for descendant in self.descendants(node) {
            if let Some(NodeKind::Text(text)) = self.kind(descendant) {
                out.push_str(text);
            }
        }
        out
    }

    /// Whitespace-collapsed text of the first `<title>`, empty when absent.
    pub fn title(&self) -> String {
        self.first_element_by_tag("title")
            .map(|node| collapse_whitespace(&self.text_content(node)))
            .unwrap_or_default()
    }

    pub fn class_tokens(&self, node: NodeId) -> Vec<&str> {
        let mut tokens: Vec<&str> = Vec::new();
        for token in self.attribute(node, "class").unwrap_or("").split_ascii_whitespace() {
            if !tokens.contains(&token) {
                tokens.push(token);
            }
        }
        tokens
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.class_tokens(node).contains(&class)
    }

    pub fn add_class(&mut self, node: NodeId, class: &str) {
        let mut tokens = self.owned_class_tokens(node);
        if !tokens.iter().any(|token| token == class) {
            tokens.push(class.to_owned());
        }
        self.write_class_tokens(node, &tokens);
    }

    pub fn remove_classes(&mut self, node: NodeId, classes: &[&str]) {
        let mut tokens = self.owned_class_tokens(node);
        tokens.retain(|token| !classes.contains(&token.as_str()));
        self.write_class_tokens(node, &tokens);
    }

    fn owned_class_tokens(&self, node: NodeId) -> Vec<String> {
        self.class_tokens(node)
            .into_iter()
            .map(str::to_owned)
            .collect()
    }

    fn write_class_tokens(&mut self, node: NodeId, tokens: &[String]) {
        // A missing attribute stays missing when there is nothing to write.
        if self.attribute(node, "class").is_none() && tokens.is_empty() {
            return;
        }
        self.set_attribute(node, "class", &tokens.join(" "));
    }

    pub fn matches(&self, node: NodeId, selector: &Selector) -> bool {
        self.is_element(node)
            && selector
                .complexes()
                .iter()
                .any(|complex| self.matches_complex(complex, 0, node))
    }

    fn matches_complex(&self, complex: &ComplexSelector, segment: usize, node: NodeId) -> bool {
        let Some(current) = complex.segments.get(segment) else {
            return true;
        };
        if !self.matches_simple(&current.simple, node) {
            return false;
        }

        let Some(combinator) = current.combinator_to_next else {
            return true;
        };

        match combinator {
            Combinator::Child => self
                .parent_element(node)
                .is_some_and(|parent| self.matches_complex(complex, segment + 1, parent)),
            Combinator::Descendant => {
                let mut ancestor = self.parent_element(node);
                while let Some(candidate) = ancestor {
                    if self.matches_complex(complex, segment + 1, candidate) {
                        return true;
                    }
                    ancestor = self.parent_element(candidate);
                }
                false
            }
        }
    }

    fn matches_simple(&self, simple: &SimpleSelector, node: NodeId) -> bool {
        let Some(tag) = self.tag_name(node) else {
            return false;
        };

        if let Some(expected) = &simple.tag
            && !expected.eq_ignore_ascii_case(tag)
        {
            return false;
        }

        if let Some(expected) = &simple.id
            && self.element_id(node) != Some(expected.as_str())
        {
            return false;
        }

        if !simple
            .classes
            .iter()
            .all(|class| self.has_class(node, class))
        {
            return false;
        }

        simple.attributes.iter().all(|requirement| {
            match (self.attribute(node, &requirement.name), &requirement.value) {
                (None, _) => false,
                (Some(_), None) => true,
                (Some(actual), Some(expected)) => actual == expected,
            }
        })
    }

    pub fn query_selector_all(&self, selectors: &str) -> ScrollmarkResult<Vec<NodeId>> {
        let selector = Selector::parse(selectors)?;
        Ok(self.select(&selector))
    }

    pub fn query_selector(&self, selectors: &str) -> ScrollmarkResult<Option<NodeId>> {
        Ok(self.query_selector_all(selectors)?.into_iter().next())
    }

    /// Matches of an already parsed selector, in document order.
    pub fn select(&self, selector: &Selector) -> Vec<NodeId> {
        self.elements()
            .into_iter()
            .filter(|node| self.matches(*node, selector))
            .collect()
    }
}

pub fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}
