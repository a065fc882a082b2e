mod commands;
mod config;
mod logging;

use clap::ArgAction;
use clap::Parser;
use clap::Subcommand;
use commands::GenerateArgs;
use commands::InspectArgs;
use commands::TrackArgs;
use config::AppConfig;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "scrollmark",
    version,
    about = "Card pages with a scroll-progress table of contents"
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    /// Configuration file; `scrollmark.toml` is used when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Render a card page from a JSON paragraph file.
    Generate(GenerateArgs),
    /// Simulate scrolling through a page and report progress changes.
    Track(TrackArgs),
    /// List a page's cards and table-of-contents entries.
    Inspect(InspectArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::load_or_default(config::DEFAULT_CONFIG_FILE.as_ref())?,
    };

    let mut stdout = std::io::stdout().lock();
    match &cli.command {
        Command::Generate(args) => {
            commands::run_generate(args, &config, &mut stdout)?;
        }
        Command::Track(args) => {
            commands::run_track(args, &config, &mut stdout)?;
        }
        Command::Inspect(args) => commands::run_inspect(args, &config, &mut stdout)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::Cli;
    use super::Command;
    use clap::CommandFactory;
    use clap::Parser;
    use std::path::Path;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_track_flags_and_global_options() {
        let cli = Cli::try_parse_from([
            "scrollmark",
            "track",
            "deck.html",
            "--viewport-height",
            "600",
            "--step",
            "25",
            "--round-trip",
            "-vv",
            "--config",
            "alt.toml",
        ])
        .unwrap_or_else(|error| panic!("{error}"));

        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config.as_deref(), Some(Path::new("alt.toml")));
        let Command::Track(args) = cli.command else {
            panic!("expected track");
        };
        assert_eq!(args.viewport_height, Some(600.0));
        assert_eq!(args.step, Some(25.0));
        assert!(args.round_trip);
    }

    #[test]
    fn generate_requires_paragraphs() {
        assert!(Cli::try_parse_from(["scrollmark", "generate"]).is_err());
    }
}
