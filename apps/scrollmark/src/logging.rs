//! Subscriber setup for the command-line binary.

use tracing_subscriber::EnvFilter;

/// Overrides the `-v` count when set, using `EnvFilter` directive syntax.
pub const LOG_ENV: &str = "SCROLLMARK_LOG";

/// Maps `-v` occurrences to a directive; saturates at `trace`.
pub const fn verbosity_to_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Installs the global stderr subscriber. Safe to call more than once.
pub fn init_logging(verbosity: u8) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(verbosity_to_directive(verbosity)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbosity >= 2)
        .with_writer(std::io::stderr)
        .try_init();
}
