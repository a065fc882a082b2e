use crate::config::AppConfig;
use anyhow::Context;
use clap::Args;
use sm_page::ViewModel;
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug, Clone, Args)]
pub struct GenerateArgs {
    /// JSON array of paragraphs.
    #[arg(long)]
    pub paragraphs: PathBuf,
    /// Stylesheet inlined into the page.
    #[arg(long)]
    pub stylesheet: Option<PathBuf>,
    /// Overrides `page.title`.
    #[arg(long)]
    pub title: Option<String>,
    /// Output file; stdout when omitted.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Renders the card page. Returns the number of cards written.
pub fn run_generate(
    args: &GenerateArgs,
    config: &AppConfig,
    stdout: &mut impl Write,
) -> anyhow::Result<usize> {
    let json = std::fs::read_to_string(&args.paragraphs)
        .with_context(|| format!("failed to read {}", args.paragraphs.display()))?;
    let paragraphs = sm_page::parse_paragraphs(&json)
        .with_context(|| format!("invalid paragraphs in {}", args.paragraphs.display()))?;

    let stylesheet = match &args.stylesheet {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read stylesheet {}", path.display()))?,
        None => String::new(),
    };

    let mut page = config.page.clone();
    if let Some(title) = &args.title {
        page.title.clone_from(title);
    }

    let view = ViewModel::build(&page, stylesheet, &paragraphs);
    let html = sm_page::render_page(&view);

    match &args.output {
        Some(path) => std::fs::write(path, &html)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => stdout.write_all(html.as_bytes())?,
    }

    tracing::info!(
        paragraphs = paragraphs.len(),
        cards = view.cards.len(),
        "page generated"
    );
    Ok(view.cards.len())
}
