//! `dummy-micro-otel` — instrumented service entry point.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from environment variables.
//! 2. Initialise the telemetry pipeline (logger, resource, OTLP traces, OTLP metrics).
//! 3. Build the instrumented Axum router and serve until SIGINT or SIGTERM.
//! 4. Flush and shut down the telemetry pipeline.

mod config;
mod server;
mod telemetry;

use anyhow::{Context, Result};
use tracing::info;

use config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e:#}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    let telemetry = telemetry::init_telemetry(&cfg).await.map_err(|e| {
        eprintln!("ERROR: telemetry initialisation failed: {e:#}");
        e
    })?;
    info!(
        service = %cfg.otel_service_name,
        version = %cfg.otel_service_version,
        environment = %cfg.deployment_environment,
        "OpenTelemetry initialized successfully"
    );

    // -----------------------------------------------------------------------
    // 3. HTTP server
    // -----------------------------------------------------------------------
    let router = server::router::build(telemetry.metrics());
    let served = common::server::serve(router, cfg.port).await;

    // -----------------------------------------------------------------------
    // 4. Shutdown
    // -----------------------------------------------------------------------
    tokio::task::spawn_blocking(move || telemetry.shutdown())
        .await
        .context("telemetry shutdown task panicked")?;

    served
}
