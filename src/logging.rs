//! Diagnostic logging setup
//!
//! Installs a `tracing` subscriber that writes to stderr. `RUST_LOG`
//! wins over the configured filter when set.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Build the filter: RUST_LOG if present and valid, otherwise `fallback`.
fn build_filter(fallback: &str, debug: bool) -> EnvFilter {
    if debug {
        return EnvFilter::new("debug");
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
}

/// Install the global subscriber. Safe to call more than once; later
/// calls are ignored.
pub fn init(fallback_filter: &str, debug: bool) {
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(build_filter(fallback_filter, debug))
        .try_init();
}
