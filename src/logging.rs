//! Diagnostic logging.
//!
//! Logs go to standard error through a compact `tracing_subscriber` fmt
//! layer. The report itself never goes through here: it is written to
//! standard output so a harness can scrape it.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding the log filter directive.
pub const LOG_ENV: &str = "CONSOLE_PROBE_LOG";

/// Filter used when [`LOG_ENV`] is unset or invalid.
pub const DEFAULT_FILTER: &str = "warn";

fn filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber. Safe to call more than once; only the first
/// call has an effect.
pub fn init() {
    let layer = fmt::layer()
        .compact()
        .without_time()
        .with_target(false)
        .with_ansi(false)
        .with_writer(std::io::stderr);

    let _ = tracing_subscriber::registry()
        .with(filter())
        .with(layer)
        .try_init();
}
