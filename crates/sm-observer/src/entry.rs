use sm_core::Rect;
use sm_dom::NodeId;

/// One visibility-change notification. Rects are in viewport (client)
/// coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct IntersectionObserverEntry {
    pub target: NodeId,
    /// Milliseconds since the page's time origin.
    pub time: f64,
    pub root_bounds: Rect,
    pub bounding_client_rect: Rect,
    pub intersection_rect: Rect,
    pub is_intersecting: bool,
    pub intersection_ratio: f64,
}

impl IntersectionObserverEntry {
    /// Entry with the given state and empty rects, for feeding reactors
    /// directly.
    pub fn synthetic(target: NodeId, is_intersecting: bool, intersection_ratio: f64) -> Self {
        Self {
            target,
            time: 0.0,
            root_bounds: Rect::default(),
            bounding_client_rect: Rect::default(),
            intersection_rect: Rect::default(),
            is_intersecting,
            intersection_ratio,
        }
    }
}
