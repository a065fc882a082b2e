//! Scroll-progress tracking for card pages.
//!
//! A [`ScrollProgressTracker`] observes every card present at
//! initialization. When a card becomes more than half visible it becomes the
//! active card: its id replaces the location fragment, the matching
//! table-of-contents entry is marked `current` and every entry whose card
//! number is not greater than the active one is marked `read`.

mod number;

pub use number::to_number;

use sm_core::ScrollmarkError;
use sm_core::ScrollmarkResult;
use sm_dom::DomSurface;
use sm_dom::NodeId;
use sm_observer::IntersectionCallback;
use sm_observer::IntersectionObserver;
use sm_observer::IntersectionObserverEntry;
use sm_observer::IntersectionObserverInit;
use sm_observer::TargetGeometry;
use sm_observer::Viewport;
use tracing::debug;
use tracing::info;
use tracing::trace;
use tracing::warn;

pub const CARD_SELECTOR: &str = ".card";
pub const TOC_ENTRY_SELECTOR: &str = ".toc-article";
/// Used both as the observer threshold and as the strict ratio cut-off.
pub const VISIBILITY_THRESHOLD: f64 = 0.5;
pub const CURRENT_CLASS: &str = "current";
pub const READ_CLASS: &str = "read";

#[derive(Debug, Clone, PartialEq)]
pub struct TrackerConfig {
    pub card_selector: String,
    pub toc_entry_selector: String,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            card_selector: CARD_SELECTOR.to_owned(),
            toc_entry_selector: TOC_ENTRY_SELECTOR.to_owned(),
        }
    }
}

/// Presentation state of one table-of-contents entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntryState {
    pub node: NodeId,
    pub href: Option<String>,
    pub current: bool,
    pub read: bool,
}

#[derive(Debug)]
pub struct ScrollProgressTracker {
    config: TrackerConfig,
    cards: Vec<NodeId>,
    observer: IntersectionObserver,
    active_card: Option<String>,
}

impl ScrollProgressTracker {
    /// Queries the cards once and subscribes each of them. Cards inserted
    /// afterwards are never observed.
    pub fn initialize(surface: &impl DomSurface, config: TrackerConfig) -> ScrollmarkResult<Self> {
        let cards = surface.query_selector_all(&config.card_selector)?;
        let mut observer = IntersectionObserver::new(IntersectionObserverInit::with_threshold(
            VISIBILITY_THRESHOLD,
        ))?;
        for card in &cards {
            observer.observe(*card);
        }

        info!(
            cards = cards.len(),
            selector = %config.card_selector,
            "scroll progress tracker initialized"
        );
        Ok(Self {
            config,
            cards,
            observer,
            active_card: None,
        })
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn cards(&self) -> &[NodeId] {
        &self.cards
    }

    pub fn observer(&self) -> &IntersectionObserver {
        &self.observer
    }

    /// Id of the most recently confirmed active card.
    pub fn active_card(&self) -> Option<&str> {
        self.active_card.as_deref()
    }

    /// Runs one observation step and delivers the resulting batch, if any.
    /// Returns the number of notifications delivered.
    pub fn process(
        &mut self,
        surface: &mut impl DomSurface,
        geometry: &impl TargetGeometry,
        viewport: Viewport,
        time: f64,
    ) -> ScrollmarkResult<usize> {
        let Self {
            config,
            observer,
            active_card,
            ..
        } = self;

        observer.update(geometry, viewport, time);
        let mut reactor = ProgressReactor::new(config, active_card, surface);
        let delivered = observer.notify(&mut reactor);
        reactor.finish().map(|()| delivered)
    }

    /// Applies one delivered batch in order.
    pub fn handle_entries(
        &mut self,
        surface: &mut impl DomSurface,
        entries: &[IntersectionObserverEntry],
    ) -> ScrollmarkResult<()> {
        let mut reactor = ProgressReactor::new(&self.config, &mut self.active_card, surface);
        reactor.on_intersection(entries);
        reactor.finish()
    }

    /// Makes `card_id` the active card.
    pub fn on_card_change(
        &mut self,
        surface: &mut impl DomSurface,
        card_id: &str,
    ) -> ScrollmarkResult<()> {
        ProgressReactor::new(&self.config, &mut self.active_card, surface).change_card(card_id)
    }

    pub fn toc_snapshot(&self, surface: &impl DomSurface) -> ScrollmarkResult<Vec<TocEntryState>> {
        Ok(surface
            .query_selector_all(&self.config.toc_entry_selector)?
            .into_iter()
            .map(|node| TocEntryState {
                node,
                href: surface.attribute(node, "href"),
                current: surface.has_class(node, CURRENT_CLASS),
                read: surface.has_class(node, READ_CLASS),
            })
            .collect())
    }
}

/// Card id a TOC `href` points at: the href without its first character.
pub fn derived_card_id(href: &str) -> &str {
    href.chars()
        .next()
        .map_or(href, |first| &href[first.len_utf8()..])
}

/// Batch handler bound to a surface for the duration of one delivery.
struct ProgressReactor<'a, S> {
    config: &'a TrackerConfig,
    active_card: &'a mut Option<String>,
    surface: &'a mut S,
    failure: Option<ScrollmarkError>,
}

impl<'a, S: DomSurface> ProgressReactor<'a, S> {
    fn new(
        config: &'a TrackerConfig,
        active_card: &'a mut Option<String>,
        surface: &'a mut S,
    ) -> Self {
        Self {
            config,
            active_card,
            surface,
            failure: None,
        }
    }

    fn qualifies(&self, entry: &IntersectionObserverEntry) -> bool {
        entry.is_intersecting && entry.intersection_ratio > VISIBILITY_THRESHOLD
    }

    fn change_card(&mut self, card_id: &str) -> ScrollmarkResult<()> {
        // Query first so a bad selector leaves the page untouched.
        let entries = self
            .surface
            .query_selector_all(&self.config.toc_entry_selector)?;

        self.surface.replace_fragment(card_id);
        for entry in &entries {
            self.surface
                .remove_classes(*entry, &[CURRENT_CLASS, READ_CLASS]);
        }

        let active_number = to_number(card_id);
        for entry in &entries {
            let Some(href) = self
                .surface
                .attribute(*entry, "href")
                .filter(|href| !href.is_empty())
            else {
                continue;
            };

            let toc_card_id = derived_card_id(&href);
            if toc_card_id == card_id {
                self.surface.add_class(*entry, CURRENT_CLASS);
            }
            // NaN on either side compares false.
            if to_number(toc_card_id) <= active_number {
                self.surface.add_class(*entry, READ_CLASS);
            }
        }

        debug!(card = card_id, toc_entries = entries.len(), "active card changed");
        *self.active_card = Some(card_id.to_owned());
        Ok(())
    }

    fn finish(self) -> ScrollmarkResult<()> {
        match self.failure {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl<S: DomSurface> IntersectionCallback for ProgressReactor<'_, S> {
    fn on_intersection(&mut self, entries: &[IntersectionObserverEntry]) {
        for entry in entries {
            if !self.qualifies(entry) {
                trace!(
                    node = entry.target,
                    ratio = entry.intersection_ratio,
                    intersecting = entry.is_intersecting,
                    "notification below visibility threshold"
                );
                continue;
            }

            let card_id = self.surface.element_id(entry.target);
            if let Err(error) = self.change_card(&card_id) {
                warn!(card = %card_id, %error, "card change failed");
                if self.failure.is_none() {
                    self.failure = Some(error);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests;
