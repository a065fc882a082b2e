use super::load_page;
use crate::config::AppConfig;
use clap::Args;
use sm_layout::LayoutEngine;
use sm_observer::Viewport;
use sm_tracker::ScrollProgressTracker;
use std::io::Write;
use std::path::PathBuf;

/// Milliseconds between two simulated scroll steps.
const FRAME_INTERVAL_MS: f64 = 16.0;

/// Upper bound on simulated steps for one pass over the page.
pub(crate) const MAX_SCROLL_STEPS: f64 = 1_000_000.0;

#[derive(Debug, Clone, Args)]
pub struct TrackArgs {
    /// Page to scroll through.
    pub html: PathBuf,
    /// Document URL; defaults to the page's `file:` URL.
    #[arg(long)]
    pub url: Option<String>,
    #[arg(long)]
    pub viewport_width: Option<f64>,
    #[arg(long)]
    pub viewport_height: Option<f64>,
    /// Pixels scrolled per step.
    #[arg(long)]
    pub step: Option<f64>,
    /// Scroll back to the top after reaching the bottom.
    #[arg(long)]
    pub round_trip: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackSummary {
    pub cards: usize,
    /// Scroll offset and new fragment, one per fragment change.
    pub changes: Vec<(f64, String)>,
    pub final_href: String,
    pub history_len: usize,
}

/// Scrolls the page from top to bottom (and back, with `--round-trip`),
/// delivering observer batches after every step. Prints one line per
/// fragment change.
pub fn run_track(
    args: &TrackArgs,
    config: &AppConfig,
    out: &mut impl Write,
) -> anyhow::Result<TrackSummary> {
    let mut settings = config.viewport.clone();
    if let Some(width) = args.viewport_width {
        settings.width = width;
    }
    if let Some(height) = args.viewport_height {
        settings.height = height;
    }
    let step = args.step.unwrap_or(settings.scroll_step);
    anyhow::ensure!(
        step.is_finite() && step > 0.0,
        "scroll step must be a positive number, got {step}"
    );
    anyhow::ensure!(
        settings.width > 0.0 && settings.height > 0.0,
        "viewport must have a positive size"
    );

    let page = load_page(&args.html, args.url.as_deref())?;
    let mut document = page.document;
    let layout = LayoutEngine::new(settings.layout_config()).compute(&document, &page.stylesheet);
    let mut tracker =
        ScrollProgressTracker::initialize(&document, config.tracker.tracker_config())?;
    let toc_total = tracker.toc_snapshot(&document)?.len();

    let viewport = Viewport::new(settings.width, settings.height);
    let offsets = scroll_offsets(layout.max_scroll(settings.height), step, args.round_trip)?;
    tracing::info!(
        cards = tracker.cards().len(),
        steps = offsets.len(),
        content_height = layout.content_height(),
        "tracking scroll progress"
    );

    let mut changes = Vec::new();
    let mut last_fragment = document.location().fragment().map(str::to_owned);
    for (frame, offset) in offsets.iter().enumerate() {
        let time = frame as f64 * FRAME_INTERVAL_MS;
        tracker.process(&mut document, &layout, viewport.scrolled_to(*offset), time)?;

        let fragment = document.location().fragment().map(str::to_owned);
        if fragment == last_fragment {
            continue;
        }

        let snapshot = tracker.toc_snapshot(&document)?;
        let current = snapshot
            .iter()
            .filter(|entry| entry.current)
            .filter_map(|entry| entry.href.as_deref())
            .collect::<Vec<_>>()
            .join(",");
        let read = snapshot.iter().filter(|entry| entry.read).count();
        let shown = fragment.as_deref().unwrap_or_default();
        writeln!(
            out,
            "{offset:>9.1}  #{shown:<8} current={current:<6} read={read}/{toc_total}"
        )?;

        changes.push((*offset, shown.to_owned()));
        last_fragment = fragment;
    }

    let summary = TrackSummary {
        cards: tracker.cards().len(),
        changes,
        final_href: document.location().href().to_owned(),
        history_len: document.location().history_len(),
    };
    writeln!(
        out,
        "{} cards, {} fragment changes, history length {}, final location {}",
        summary.cards,
        summary.changes.len(),
        summary.history_len,
        summary.final_href
    )?;
    Ok(summary)
}

/// `0, step, 2*step, ..` up to and including `max`, then back to `0` when
/// `round_trip` is set. Fails when a pass would exceed [`MAX_SCROLL_STEPS`].
pub(crate) fn scroll_offsets(max: f64, step: f64, round_trip: bool) -> anyhow::Result<Vec<f64>> {
    let steps = (max.max(0.0) / step).ceil();
    anyhow::ensure!(
        steps.is_finite() && steps <= MAX_SCROLL_STEPS,
        "scrolling {max:.0}px in steps of {step}px needs {steps} steps, more than {MAX_SCROLL_STEPS}; use a larger --step"
    );

    let mut offsets = Vec::with_capacity(steps as usize + 1);
    let mut offset = 0.0;
    while offset < max {
        offsets.push(offset);
        offset += step;
    }
    offsets.push(max.max(0.0));

    if round_trip {
        let back: Vec<f64> = offsets.iter().rev().skip(1).copied().collect();
        offsets.extend(back);
    }
    Ok(offsets)
}
