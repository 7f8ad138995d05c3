//! Configuration loading and validation for the plain service.

use anyhow::{Context, Result};
use serde::Deserialize;

/// Validated plain-service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// TCP port the HTTP server listens on (`PORT`).
    #[serde(default = "default_port")]
    pub port: u16,

    /// Tracing log level (`LOG_LEVEL`), overridden by `RUST_LOG`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_port() -> u16 {
    8080
}
fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
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
            .context("failed to build dummy-micro configuration")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise dummy-micro configuration")?;

        c.validate()?;
        Ok(c)
    }

    fn validate(&self) -> Result<()> {
        if self.log_level.trim().is_empty() {
            anyhow::bail!("LOG_LEVEL must not be empty");
        }
        Ok(())
    }
}
