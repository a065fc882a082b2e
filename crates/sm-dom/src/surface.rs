//! Rendering-surface capabilities consumed by page-level reactors.

use crate::Document;
use crate::NodeId;
use sm_core::ScrollmarkResult;

/// The slice of a live page a scroll reactor is allowed to touch: element
/// lookup, attribute reads, presentation-class toggling and in-place
/// fragment replacement.
pub trait DomSurface {
    /// Elements matching `selectors`, in document order.
    fn query_selector_all(&self, selectors: &str) -> ScrollmarkResult<Vec<NodeId>>;

    /// Element id, or the empty string when the element carries none.
    fn element_id(&self, node: NodeId) -> String;

    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;

    fn has_class(&self, node: NodeId, class: &str) -> bool;

    fn add_class(&mut self, node: NodeId, class: &str);

    fn remove_classes(&mut self, node: NodeId, classes: &[&str]);

    /// Replaces the fragment of the current location without adding a
    /// history entry.
    fn replace_fragment(&mut self, fragment: &str);
}

impl DomSurface for Document {
    fn query_selector_all(&self, selectors: &str) -> ScrollmarkResult<Vec<NodeId>> {
        Document::query_selector_all(self, selectors)
    }

    fn element_id(&self, node: NodeId) -> String {
        Document::element_id(self, node).unwrap_or_default().to_owned()
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        Document::attribute(self, node, name).map(str::to_owned)
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        Document::has_class(self, node, class)
    }

    fn add_class(&mut self, node: NodeId, class: &str) {
        Document::add_class(self, node, class);
    }

    fn remove_classes(&mut self, node: NodeId, classes: &[&str]) {
        Document::remove_classes(self, node, classes);
    }

    fn replace_fragment(&mut self, fragment: &str) {
        self.location_mut().replace_fragment(fragment);
    }
}
