use super::load_page;
use crate::config::AppConfig;
use clap::Args;
use sm_layout::LayoutEngine;
use sm_tracker::derived_card_id;
use sm_tracker::to_number;
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug, Clone, Args)]
pub struct InspectArgs {
    /// Page to inspect.
    pub html: PathBuf,
}

/// Lists the cards with their layout boxes and the TOC entries with the card
/// id and number each one resolves to.
pub fn run_inspect(args: &InspectArgs, config: &AppConfig, out: &mut impl Write) -> anyhow::Result<()> {
    let page = load_page(&args.html, None)?;
    let document = &page.document;
    let layout =
        LayoutEngine::new(config.viewport.layout_config()).compute(document, &page.stylesheet);

    writeln!(out, "title: {}", document.title())?;
    writeln!(out, "content height: {:.1}", layout.content_height())?;

    let cards = document.query_selector_all(&config.tracker.card_selector)?;
    writeln!(out, "cards ({}):", cards.len())?;
    for card in cards {
        let id = document.element_id(card).unwrap_or_default();
        match layout.bounding_rect(card) {
            Some(rect) => writeln!(
                out,
                "  #{id:<8} y={:<9.1} height={:.1}",
                rect.y, rect.height
            )?,
            None => writeln!(out, "  #{id:<8} not rendered")?,
        }
    }

    let entries = document.query_selector_all(&config.tracker.toc_selector)?;
    writeln!(out, "toc entries ({}):", entries.len())?;
    for entry in entries {
        match document.attribute(entry, "href").filter(|href| !href.is_empty()) {
            Some(href) => {
                let card_id = derived_card_id(href);
                writeln!(
                    out,
                    "  {href:<10} card={card_id:<8} number={}",
                    to_number(card_id)
                )?;
            }
            None => writeln!(out, "  (no href, never marked)")?,
        }
    }
    Ok(())
}
