//! `dummy-micro` — plain service entry point.
//!
//! Startup sequence:
//! 1. Load and validate [`config::Config`] from environment variables.
//! 2. Initialise structured JSON logging.
//! 3. Serve the ping/purchase router until SIGINT or SIGTERM.

mod config;
mod server;
mod telemetry;

use anyhow::Result;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = config::Config::from_env().map_err(|e| {
        eprintln!("ERROR: dummy-micro configuration invalid: {e:#}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init(&cfg.log_level)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        port = cfg.port,
        "dummy-micro starting"
    );

    // -----------------------------------------------------------------------
    // 3. HTTP server
    // -----------------------------------------------------------------------
    common::server::serve(server::build(), cfg.port).await
}
