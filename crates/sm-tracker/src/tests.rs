use super::ScrollProgressTracker;
use super::TrackerConfig;
use super::derived_card_id;
use sm_core::ScrollmarkError;
use sm_core::ScrollmarkResult;
use sm_dom::DomSurface;
use sm_dom::NodeId;
use sm_observer::IntersectionObserverEntry;

#[derive(Debug, Default)]
struct FakeElement {
    id: String,
    class: String,
    href: Option<String>,
    classes: Vec<String>,
}

/// In-memory surface understanding only single-class selectors.
#[derive(Debug, Default)]
struct FakeSurface {
    elements: Vec<FakeElement>,
    fragment: Option<String>,
    fragment_replacements: usize,
}

impl FakeSurface {
    fn card(&mut self, id: &str) -> NodeId {
        self.elements.push(FakeElement {
            id: id.to_owned(),
            class: "card".to_owned(),
            ..FakeElement::default()
        });
        self.elements.len() - 1
    }

    fn toc(&mut self, href: Option<&str>) -> NodeId {
        self.elements.push(FakeElement {
            class: "toc-article".to_owned(),
            href: href.map(str::to_owned),
            ..FakeElement::default()
        });
        self.elements.len() - 1
    }

    /// Cards and TOC entries with ids `first..=last`.
    fn deck(first: u32, last: u32) -> (Self, Vec<NodeId>) {
        let mut surface = Self::default();
        let cards = (first..=last)
            .map(|index| surface.card(&index.to_string()))
            .collect();
        for index in first..=last {
            surface.toc(Some(&format!("#{index}")));
        }
        (surface, cards)
    }

    fn flagged(&self, class: &str) -> Vec<&str> {
        self.elements
            .iter()
            .filter(|element| element.classes.iter().any(|token| token == class))
            .map(|element| element.href.as_deref().unwrap_or("<none>"))
            .collect()
    }
}

impl DomSurface for FakeSurface {
    fn query_selector_all(&self, selectors: &str) -> ScrollmarkResult<Vec<NodeId>> {
        let Some(class) = selectors.strip_prefix('.') else {
            return Err(ScrollmarkError::new(
                "dom.selector.invalid",
                format!("unsupported selector `{selectors}`"),
            ));
        };
        Ok(self
            .elements
            .iter()
            .enumerate()
            .filter(|(_, element)| element.class == class)
            .map(|(node, _)| node)
            .collect())
    }

    fn element_id(&self, node: NodeId) -> String {
        self.elements
            .get(node)
            .map(|element| element.id.clone())
            .unwrap_or_default()
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        match name {
            "href" => self.elements.get(node)?.href.clone(),
            _ => None,
        }
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.elements
            .get(node)
            .is_some_and(|element| element.classes.iter().any(|token| token == class))
    }

    fn add_class(&mut self, node: NodeId, class: &str) {
        if let Some(element) = self.elements.get_mut(node)
            && !element.classes.iter().any(|token| token == class)
        {
            element.classes.push(class.to_owned());
        }
    }

    fn remove_classes(&mut self, node: NodeId, classes: &[&str]) {
        if let Some(element) = self.elements.get_mut(node) {
            element
                .classes
                .retain(|token| !classes.contains(&token.as_str()));
        }
    }

    fn replace_fragment(&mut self, fragment: &str) {
        self.fragment = Some(fragment.to_owned());
        self.fragment_replacements += 1;
    }
}

fn tracker(surface: &FakeSurface) -> ScrollProgressTracker {
    ScrollProgressTracker::initialize(surface, TrackerConfig::default())
        .unwrap_or_else(|error| panic!("{error}"))
}

fn visible(target: NodeId, ratio: f64) -> IntersectionObserverEntry {
    IntersectionObserverEntry::synthetic(target, true, ratio)
}

fn deliver(
    tracker: &mut ScrollProgressTracker,
    surface: &mut FakeSurface,
    entries: &[IntersectionObserverEntry],
) {
    tracker
        .handle_entries(surface, entries)
        .unwrap_or_else(|error| panic!("{error}"));
}

#[test]
fn initialize_observes_every_card_once() {
    let (surface, cards) = FakeSurface::deck(1, 5);
    let tracker = tracker(&surface);
    assert_eq!(tracker.cards(), cards.as_slice());
    assert_eq!(tracker.observer().observed_targets(), cards);
    assert_eq!(tracker.observer().thresholds(), &[0.5]);
    assert_eq!(tracker.active_card(), None);
}

#[test]
fn initialize_without_cards_subscribes_nothing() {
    let surface = FakeSurface::default();
    let tracker = tracker(&surface);
    assert!(tracker.cards().is_empty());
    assert!(tracker.observer().observed_targets().is_empty());
}

#[test]
fn initialize_reports_collaborator_failures() {
    let surface = FakeSurface::default();
    let config = TrackerConfig {
        card_selector: "div".to_owned(),
        ..TrackerConfig::default()
    };
    let result = ScrollProgressTracker::initialize(&surface, config);
    assert!(result.is_err_and(|error| error.is("dom.selector.invalid")));
}

#[test]
fn visible_card_marks_progress() {
    let (mut surface, cards) = FakeSurface::deck(1, 5);
    let mut tracker = tracker(&surface);

    deliver(&mut tracker, &mut surface, &[visible(cards[2], 0.7)]);

    assert_eq!(surface.fragment.as_deref(), Some("3"));
    assert_eq!(surface.flagged("read"), vec!["#1", "#2", "#3"]);
    assert_eq!(surface.flagged("current"), vec!["#3"]);
    assert_eq!(tracker.active_card(), Some("3"));
}

#[test]
fn exactly_half_visible_is_ignored() {
    let (mut surface, cards) = FakeSurface::deck(1, 5);
    let mut tracker = tracker(&surface);

    deliver(&mut tracker, &mut surface, &[visible(cards[1], 0.5)]);

    assert_eq!(surface.fragment, None);
    assert_eq!(surface.fragment_replacements, 0);
    assert!(surface.flagged("read").is_empty());
    assert_eq!(tracker.active_card(), None);
}

#[test]
fn non_intersecting_notifications_are_ignored() {
    let (mut surface, cards) = FakeSurface::deck(1, 3);
    let mut tracker = tracker(&surface);

    let leaving = IntersectionObserverEntry::synthetic(cards[0], false, 0.9);
    deliver(&mut tracker, &mut surface, &[leaving]);

    assert_eq!(surface.fragment_replacements, 0);
}

#[test]
fn repeated_notification_is_idempotent() {
    let (mut surface, cards) = FakeSurface::deck(1, 5);
    let mut tracker = tracker(&surface);

    deliver(&mut tracker, &mut surface, &[visible(cards[3], 0.8)]);
    let read = surface.flagged("read").join(",");
    let current = surface.flagged("current").join(",");

    deliver(&mut tracker, &mut surface, &[visible(cards[3], 0.8)]);
    assert_eq!(surface.flagged("read").join(","), read);
    assert_eq!(surface.flagged("current").join(","), current);
    assert_eq!(surface.fragment.as_deref(), Some("4"));
}

#[test]
fn later_notifications_in_a_batch_win() {
    let (mut surface, cards) = FakeSurface::deck(1, 5);
    let mut tracker = tracker(&surface);

    deliver(
        &mut tracker,
        &mut surface,
        &[visible(cards[1], 0.9), visible(cards[3], 0.6)],
    );

    assert_eq!(tracker.active_card(), Some("4"));
    assert_eq!(surface.fragment.as_deref(), Some("4"));
    assert_eq!(surface.flagged("read"), vec!["#1", "#2", "#3", "#4"]);
    assert_eq!(surface.flagged("current"), vec!["#4"]);
    assert_eq!(surface.fragment_replacements, 2);
}

#[test]
fn moving_back_clears_stale_flags() {
    let (mut surface, cards) = FakeSurface::deck(1, 5);
    let mut tracker = tracker(&surface);

    deliver(&mut tracker, &mut surface, &[visible(cards[4], 1.0)]);
    deliver(&mut tracker, &mut surface, &[visible(cards[0], 1.0)]);

    assert_eq!(surface.flagged("read"), vec!["#1"]);
    assert_eq!(surface.flagged("current"), vec!["#1"]);
}

#[test]
fn unrelated_classes_survive_a_card_change() {
    let (mut surface, cards) = FakeSurface::deck(1, 2);
    let entry = surface.toc(Some("#2"));
    surface.add_class(entry, "highlight");
    let mut tracker = tracker(&surface);

    deliver(&mut tracker, &mut surface, &[visible(cards[0], 0.9)]);

    assert!(surface.has_class(entry, "highlight"));
    assert!(!surface.has_class(entry, "read"));
}

#[test]
fn entries_without_href_never_get_flags() {
    let (mut surface, cards) = FakeSurface::deck(1, 3);
    let missing = surface.toc(None);
    let empty = surface.toc(Some(""));
    surface.add_class(missing, "current");
    let mut tracker = tracker(&surface);

    deliver(&mut tracker, &mut surface, &[visible(cards[2], 0.9)]);

    for entry in [missing, empty] {
        assert!(!surface.has_class(entry, "current"));
        assert!(!surface.has_class(entry, "read"));
    }
}

#[test]
fn non_numeric_ids_are_current_but_never_read() {
    let mut surface = FakeSurface::default();
    let intro = surface.card("intro");
    surface.card("1");
    let intro_entry = surface.toc(Some("#intro"));
    let first_entry = surface.toc(Some("#1"));
    let mut tracker = tracker(&surface);

    deliver(&mut tracker, &mut surface, &[visible(intro, 0.9)]);

    assert_eq!(surface.fragment.as_deref(), Some("intro"));
    assert!(surface.has_class(intro_entry, "current"));
    assert!(!surface.has_class(intro_entry, "read"));
    assert!(!surface.has_class(first_entry, "read"));
}

#[test]
fn bare_hash_href_counts_as_card_zero() {
    let (mut surface, cards) = FakeSurface::deck(1, 3);
    let bare = surface.toc(Some("#"));
    let mut tracker = tracker(&surface);

    deliver(&mut tracker, &mut surface, &[visible(cards[1], 0.9)]);

    assert!(surface.has_class(bare, "read"));
    assert!(!surface.has_class(bare, "current"));
}

#[test]
fn numeric_comparison_is_not_textual() {
    let (mut surface, cards) = FakeSurface::deck(1, 10);
    let mut tracker = tracker(&surface);

    deliver(&mut tracker, &mut surface, &[visible(cards[9], 0.9)]);

    assert_eq!(surface.flagged("read").len(), 10);
    assert_eq!(surface.flagged("current"), vec!["#10"]);
}

#[test]
fn card_without_id_sets_empty_fragment() {
    let mut surface = FakeSurface::default();
    let card = surface.card("");
    surface.toc(Some("#1"));
    let mut tracker = tracker(&surface);

    deliver(&mut tracker, &mut surface, &[visible(card, 0.9)]);

    assert_eq!(surface.fragment.as_deref(), Some(""));
    assert!(surface.flagged("read").is_empty());
}

#[test]
fn on_card_change_replaces_fragment_and_toc_state() {
    let (mut surface, _) = FakeSurface::deck(0, 2);
    let mut tracker = tracker(&surface);

    tracker
        .on_card_change(&mut surface, "1")
        .unwrap_or_else(|error| panic!("{error}"));

    let snapshot = tracker
        .toc_snapshot(&surface)
        .unwrap_or_else(|error| panic!("{error}"));
    let states: Vec<_> = snapshot
        .iter()
        .map(|entry| (entry.href.as_deref(), entry.current, entry.read))
        .collect();
    assert_eq!(
        states,
        vec![
            (Some("#0"), false, true),
            (Some("#1"), true, true),
            (Some("#2"), false, false),
        ]
    );
}

#[test]
fn failed_toc_query_leaves_the_page_untouched() {
    let (mut surface, cards) = FakeSurface::deck(1, 2);
    let config = TrackerConfig {
        toc_entry_selector: "nav a".to_owned(),
        ..TrackerConfig::default()
    };
    let mut tracker = ScrollProgressTracker::initialize(&surface, config)
        .unwrap_or_else(|error| panic!("{error}"));

    let result = tracker.handle_entries(&mut surface, &[visible(cards[0], 0.9)]);

    assert!(result.is_err_and(|error| error.is("dom.selector.invalid")));
    assert_eq!(surface.fragment, None);
    assert_eq!(tracker.active_card(), None);
}

#[test]
fn derived_id_drops_the_first_character() {
    assert_eq!(derived_card_id("#12"), "12");
    assert_eq!(derived_card_id("x3"), "3");
    assert_eq!(derived_card_id("#"), "");
    assert_eq!(derived_card_id(""), "");
    assert_eq!(derived_card_id("é7"), "7");
}

mod end_to_end {
    use super::super::ScrollProgressTracker;
    use super::super::TrackerConfig;
    use sm_css::CssParser;
    use sm_dom::Document;
    use sm_dom::Location;
    use sm_html::HtmlParser;
    use sm_layout::LayoutConfig;
    use sm_layout::LayoutEngine;
    use sm_observer::Viewport;

    const PAGE: &str = r##"<!DOCTYPE html>
<html><head><title>Deck</title>
<style>.card { height: 100vh } nav { display: none }</style></head>
<body>
<nav class="toc">
  <a class="toc-article" href="#0">Title</a>
  <a class="toc-article" href="#1">One</a>
  <a class="toc-article" href="#2">Two</a>
  <a class="toc-article" href="#3">Three</a>
  <a class="toc-article" href="#4">Four</a>
</nav>
<div class="container">
  <div id="0" class="card">title</div>
  <div id="1" class="card">one</div>
  <div id="2" class="card">two</div>
  <div id="3" class="card">three</div>
  <div id="4" class="card">four</div>
</div>
</body></html>"##;

    fn load() -> Document {
        let location = Location::new("https://example.com/deck.html")
            .unwrap_or_else(|error| panic!("{error}"));
        HtmlParser.parse_at(PAGE, location)
    }

    fn current_and_read(doc: &Document) -> (Vec<String>, usize) {
        let entries = doc
            .query_selector_all(".toc-article")
            .unwrap_or_else(|error| panic!("{error}"));
        let current = entries
            .iter()
            .filter(|node| doc.has_class(**node, "current"))
            .filter_map(|node| doc.attribute(*node, "href").map(str::to_owned))
            .collect();
        let read = entries
            .iter()
            .filter(|node| doc.has_class(**node, "read"))
            .count();
        (current, read)
    }

    #[test]
    fn scrolling_through_the_deck_tracks_progress() {
        let mut doc = load();
        let css = CssParser.parse(&HtmlParser.stylesheet_source(&doc));
        let config = LayoutConfig {
            viewport_width: 800.0,
            viewport_height: 600.0,
            ..LayoutConfig::default()
        };
        let layout = LayoutEngine::new(config).compute(&doc, &css);
        let viewport = Viewport::new(800.0, 600.0);

        let mut tracker = ScrollProgressTracker::initialize(&doc, TrackerConfig::default())
            .unwrap_or_else(|error| panic!("{error}"));
        assert_eq!(tracker.cards().len(), 5);

        let mut step = |doc: &mut Document, scroll: f64| {
            tracker
                .process(doc, &layout, viewport.scrolled_to(scroll), scroll)
                .unwrap_or_else(|error| panic!("{error}"))
        };

        assert_eq!(step(&mut doc, 0.0), 5);
        assert_eq!(doc.location().fragment(), Some("0"));

        // Card 1 is two thirds visible, card 0 one third.
        step(&mut doc, 400.0);
        assert_eq!(doc.location().fragment(), Some("1"));
        assert_eq!(current_and_read(&doc), (vec!["#1".to_owned()], 2));

        // Nothing crosses a threshold.
        assert_eq!(step(&mut doc, 410.0), 0);

        step(&mut doc, 2400.0);
        assert_eq!(doc.location().fragment(), Some("4"));
        assert_eq!(current_and_read(&doc), (vec!["#4".to_owned()], 5));
        assert_eq!(doc.location().history_len(), 1);
        assert_eq!(doc.location().href(), "https://example.com/deck.html#4");
    }
}
