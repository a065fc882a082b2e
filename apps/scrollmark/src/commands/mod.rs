mod generate;
mod inspect;
mod track;

pub use generate::GenerateArgs;
pub use generate::run_generate;
pub use inspect::InspectArgs;
pub use inspect::run_inspect;
pub use track::TrackArgs;
pub use track::run_track;

use anyhow::Context;
use sm_css::CssParser;
use sm_css::StyleSheet;
use sm_dom::Document;
use sm_dom::Location;
use sm_html::HtmlParser;
use std::path::Path;
use url::Url;

/// A page read from disk together with its inline styles.
struct LoadedPage {
    document: Document,
    stylesheet: StyleSheet,
}

/// Reads and parses `path`. The document URL is `url` when given, else the
/// `file:` URL of the page.
fn load_page(path: &Path, url: Option<&str>) -> anyhow::Result<LoadedPage> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read page {}", path.display()))?;

    let href = match url {
        Some(url) => url.to_owned(),
        None => file_url(path)?,
    };
    let location = Location::new(&href)?;

    let document = HtmlParser.parse_bytes(&bytes, "text/html", location);
    let stylesheet = CssParser.parse(&HtmlParser.stylesheet_source(&document));
    tracing::info!(
        page = %path.display(),
        nodes = document.node_count(),
        rules = stylesheet.rule_count(),
        "page loaded"
    );

    Ok(LoadedPage {
        document,
        stylesheet,
    })
}

fn file_url(path: &Path) -> anyhow::Result<String> {
    let absolute = std::fs::canonicalize(path)
        .with_context(|| format!("failed to resolve {}", path.display()))?;
    Url::from_file_path(&absolute)
        .map(String::from)
        .map_err(|()| anyhow::anyhow!("{} cannot be expressed as a file URL", absolute.display()))
}
