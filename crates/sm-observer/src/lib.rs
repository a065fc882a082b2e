//! Intersection observation of elements against the scrolling viewport.
//!
//! The observer keeps per-target bookkeeping (last threshold index and last
//! intersecting state) and, on every [`IntersectionObserver::update`], queues
//! one entry for each target whose visibility crossed a threshold. Queued
//! entries are delivered in one batch per [`IntersectionObserver::notify`].

mod entry;

pub use entry::IntersectionObserverEntry;

use sm_core::Rect;
use sm_core::ScrollmarkError;
use sm_core::ScrollmarkResult;
use sm_core::SideOffsets;
use sm_dom::NodeId;
use sm_layout::LayoutTree;

/// Observer options.
#[derive(Debug, Clone, PartialEq)]
pub struct IntersectionObserverInit {
    pub thresholds: Vec<f64>,
    /// Grows (or, when negative, shrinks) the viewport before intersecting.
    pub root_margin: SideOffsets,
}

impl Default for IntersectionObserverInit {
    fn default() -> Self {
        Self {
            thresholds: vec![0.0],
            root_margin: SideOffsets::default(),
        }
    }
}

impl IntersectionObserverInit {
    pub fn with_threshold(threshold: f64) -> Self {
        Self {
            thresholds: vec![threshold],
            ..Self::default()
        }
    }
}

/// Where observed targets are, in document coordinates.
pub trait TargetGeometry {
    /// `None` when the target is not rendered.
    fn bounding_rect(&self, target: NodeId) -> Option<Rect>;
}

impl TargetGeometry for LayoutTree {
    fn bounding_rect(&self, target: NodeId) -> Option<Rect> {
        LayoutTree::bounding_rect(self, target)
    }
}

/// Receiver of delivered notification batches.
pub trait IntersectionCallback {
    fn on_intersection(&mut self, entries: &[IntersectionObserverEntry]);
}

impl<F> IntersectionCallback for F
where
    F: FnMut(&[IntersectionObserverEntry]),
{
    fn on_intersection(&mut self, entries: &[IntersectionObserverEntry]) {
        self(entries);
    }
}

/// Scroll position of the viewport within the document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub scroll_x: f64,
    pub scroll_y: f64,
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            scroll_x: 0.0,
            scroll_y: 0.0,
            width,
            height,
        }
    }

    pub fn scrolled_to(self, scroll_y: f64) -> Self {
        Self { scroll_y, ..self }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Registration {
    target: NodeId,
    /// `None` until the first observation.
    previous_threshold_index: Option<usize>,
    previous_is_intersecting: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IntersectionObserver {
    thresholds: Vec<f64>,
    root_margin: SideOffsets,
    registrations: Vec<Registration>,
    queued: Vec<IntersectionObserverEntry>,
}

impl IntersectionObserver {
    pub fn new(init: IntersectionObserverInit) -> ScrollmarkResult<Self> {
        let mut thresholds = init.thresholds;
        if let Some(bad) = thresholds
            .iter()
            .find(|value| !(0.0..=1.0).contains(*value))
        {
            return Err(ScrollmarkError::new(
                "observer.threshold.out_of_range",
                format!("threshold {bad} is outside [0, 1]"),
            ));
        }

        thresholds.sort_by(f64::total_cmp);
        thresholds.dedup();
        if thresholds.is_empty() {
            thresholds.push(0.0);
        }

        Ok(Self {
            thresholds,
            root_margin: init.root_margin,
            registrations: Vec::new(),
            queued: Vec::new(),
        })
    }

    pub fn thresholds(&self) -> &[f64] {
        &self.thresholds
    }

    /// Starts observing `target`; observing it twice is a no-op.
    pub fn observe(&mut self, target: NodeId) {
        if self.is_observing(target) {
            return;
        }
        self.registrations.push(Registration {
            target,
            previous_threshold_index: None,
            previous_is_intersecting: false,
        });
    }

    pub fn unobserve(&mut self, target: NodeId) {
        self.registrations
            .retain(|registration| registration.target != target);
        self.queued.retain(|entry| entry.target != target);
    }

    pub fn disconnect(&mut self) {
        self.registrations.clear();
        self.queued.clear();
    }

    pub fn is_observing(&self, target: NodeId) -> bool {
        self.registrations
            .iter()
            .any(|registration| registration.target == target)
    }

    pub fn observed_targets(&self) -> Vec<NodeId> {
        self.registrations
            .iter()
            .map(|registration| registration.target)
            .collect()
    }

    pub fn take_records(&mut self) -> Vec<IntersectionObserverEntry> {
        std::mem::take(&mut self.queued)
    }

    pub fn pending_records(&self) -> usize {
        self.queued.len()
    }

    /// Runs one observation step for the viewport at its current scroll
    /// offset and queues entries for targets whose state changed.
    pub fn update(&mut self, geometry: &impl TargetGeometry, viewport: Viewport, time: f64) {
        let root_bounds =
            Rect::new(0.0, 0.0, viewport.width, viewport.height).outset(self.root_margin);

        for registration in &mut self.registrations {
            let observation = observe_target(geometry, registration.target, viewport, root_bounds);
            let index = threshold_index(&self.thresholds, observation.ratio);

            if registration.previous_threshold_index == Some(index)
                && registration.previous_is_intersecting == observation.is_intersecting
            {
                continue;
            }

            registration.previous_threshold_index = Some(index);
            registration.previous_is_intersecting = observation.is_intersecting;

            tracing::trace!(
                node = registration.target,
                ratio = observation.ratio,
                intersecting = observation.is_intersecting,
                "queue intersection entry"
            );
            self.queued.push(IntersectionObserverEntry {
                target: registration.target,
                time,
                root_bounds,
                bounding_client_rect: observation.target_rect,
                intersection_rect: observation.intersection_rect,
                is_intersecting: observation.is_intersecting,
                intersection_ratio: observation.ratio,
            });
        }
    }

    /// Delivers queued entries as one batch; returns how many were delivered.
    pub fn notify(&mut self, callback: &mut impl IntersectionCallback) -> usize {
        let records = self.take_records();
        if records.is_empty() {
            return 0;
        }
        callback.on_intersection(&records);
        records.len()
    }
}

struct Observation {
    target_rect: Rect,
    intersection_rect: Rect,
    is_intersecting: bool,
    ratio: f64,
}

fn observe_target(
    geometry: &impl TargetGeometry,
    target: NodeId,
    viewport: Viewport,
    root_bounds: Rect,
) -> Observation {
    let Some(document_rect) = geometry.bounding_rect(target) else {
        return Observation {
            target_rect: Rect::default(),
            intersection_rect: Rect::default(),
            is_intersecting: false,
            ratio: 0.0,
        };
    };

    let target_rect = document_rect.translate(-viewport.scroll_x, -viewport.scroll_y);
    let intersection = target_rect.intersection(&root_bounds);
    let is_intersecting = intersection.is_some();
    let intersection_rect = intersection.unwrap_or_default();

    let target_area = target_rect.area();
    let ratio = if target_area > 0.0 {
        (intersection_rect.area() / target_area).clamp(0.0, 1.0)
    } else if is_intersecting {
        1.0
    } else {
        0.0
    };

    Observation {
        target_rect,
        intersection_rect,
        is_intersecting,
        ratio,
    }
}

/// Index of the first threshold greater than `ratio`, or the threshold count
/// when `ratio` reaches the last one.
fn threshold_index(thresholds: &[f64], ratio: f64) -> usize {
    thresholds
        .iter()
        .position(|threshold| *threshold > ratio)
        .unwrap_or(thresholds.len())
}
