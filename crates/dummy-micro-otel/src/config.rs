//! Configuration loading and validation for the instrumented service.
//!
//! All values are read from environment variables at startup. Names follow the
//! OpenTelemetry SDK environment conventions where one exists, so the same
//! deployment manifest drives both this service and any sidecar collector.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Validated instrumented-service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// TCP port the HTTP server listens on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// `service.name` resource attribute.
    #[serde(default = "default_service_name")]
    pub otel_service_name: String,

    /// `service.version` resource attribute.
    #[serde(default = "default_service_version")]
    pub otel_service_version: String,

    /// `deployment.environment` resource attribute.
    #[serde(default = "default_deployment_environment")]
    pub deployment_environment: String,

    /// OTLP/gRPC collector address. A bare `host:port` is accepted.
    #[serde(default = "default_otlp_endpoint")]
    pub otel_exporter_otlp_endpoint: String,

    /// Metric export interval in milliseconds.
    #[serde(default = "default_metric_export_interval")]
    pub otel_metric_export_interval: u64,

    /// Trace sampling ratio in `[0.0, 1.0]`, applied to root spans only.
    #[serde(default = "default_sampler_arg")]
    pub otel_traces_sampler_arg: f64,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_port() -> u16 {
    8080
}
fn default_service_name() -> String {
    "go-microservice".into()
}
fn default_service_version() -> String {
    "v1.0.0".into()
}
fn default_deployment_environment() -> String {
    "production".into()
}
fn default_otlp_endpoint() -> String {
    "otel-collector.go-service-obs.svc.cluster.local:4317".into()
}
fn default_metric_export_interval() -> u64 {
    30_000
}
fn default_sampler_arg() -> f64 {
    0.1
}
fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable cannot be parsed or fails validation.
    pub fn from_env() -> Result<Self> {
        Self::from_builder(
            config::Config::builder().add_source(config::Environment::default()),
        )
    }

    fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self> {
        let cfg = builder
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Metric export interval as a [`Duration`].
    pub fn metric_export_interval(&self) -> Duration {
        Duration::from_millis(self.otel_metric_export_interval)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        ensure_non_empty(&self.otel_service_name, "OTEL_SERVICE_NAME")?;
        ensure_non_empty(&self.otel_service_version, "OTEL_SERVICE_VERSION")?;
        ensure_non_empty(&self.deployment_environment, "DEPLOYMENT_ENVIRONMENT")?;
        ensure_non_empty(&self.otel_exporter_otlp_endpoint, "OTEL_EXPORTER_OTLP_ENDPOINT")?;

        if self.otel_metric_export_interval == 0 {
            anyhow::bail!("OTEL_METRIC_EXPORT_INTERVAL must be > 0");
        }
        if !(0.0..=1.0).contains(&self.otel_traces_sampler_arg) {
            anyhow::bail!(
                "OTEL_TRACES_SAMPLER_ARG must be within [0, 1], got {}",
                self.otel_traces_sampler_arg
            );
        }
        Ok(())
    }
}

fn ensure_non_empty(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        anyhow::bail!("{name} is required and must not be empty");
    }
    Ok(())
}
