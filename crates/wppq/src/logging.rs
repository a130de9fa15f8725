//! Tracing subscriber setup

use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Build the filter: `RUST_LOG` when set, otherwise the configured directive
fn build_filter(default_directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive))
        .unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Initialize tracing subscriber for logging
///
/// Writes to stderr so `--json` output on stdout stays parseable.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed
pub fn init_tracing(default_directive: &str) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(build_filter(default_directive))
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing subscriber: {e}"))
}
