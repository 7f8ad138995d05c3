//! Logging setup for the plain service.
//!
//! Structured JSON logs on stdout only. There is no OTLP export in this variant;
//! request-level visibility comes from the access-log layer in [`crate::server`].

use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Install the global JSON subscriber.
///
/// `RUST_LOG` wins over `log_level` when set.
///
/// # Errors
///
/// Returns an error if a global subscriber has already been set.
pub fn init(log_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::fmt()
        .json()
        .flatten_event(true)
        .with_current_span(false)
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialise dummy-micro logger: {e}"))
}
