//! OTEL SDK initialisation: JSON logger, service resource, OTLP trace and metric
//! pipelines.

use std::sync::Arc;

use anyhow::{Context, Result};
use opentelemetry::{global, metrics::MeterProvider as _, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    propagation::TraceContextPropagator,
    runtime,
    trace::{self as sdktrace, Sampler},
    Resource,
};
use opentelemetry_semantic_conventions::resource::{
    DEPLOYMENT_ENVIRONMENT, SERVICE_NAME, SERVICE_VERSION,
};
use tracing::{info, warn};
use tracing_subscriber::{
    filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

use super::endpoint::{CollectorEndpoint, CONNECT_TIMEOUT};
use super::instruments::Instruments;
use super::Telemetry;
use crate::config::Config;

/// Schema URL of the semantic conventions used for resource attributes.
const SCHEMA_URL: &str = "https://opentelemetry.io/schemas/1.17.0";

/// Initialise the global tracing subscriber and both OTLP pipelines.
///
/// Order: logger → resource → tracing → metrics. The logger layer is built
/// first but only becomes the global subscriber together with the OTEL layer,
/// so anything failing before that point is reported by the caller on stderr.
///
/// # Errors
///
/// Returns an error if the collector endpoint is invalid or unreachable, if an
/// OTLP pipeline cannot be built, or if a global subscriber is already set.
pub async fn init_telemetry(cfg: &Config) -> Result<Telemetry> {
    // --- Logger ---
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.log_level));
    let log_layer = tracing_subscriber::fmt::layer()
        .json()
        .flatten_event(true)
        .with_current_span(false)
        .with_span_list(false)
        .with_filter(env_filter);

    // --- Resource ---
    let resource = service_resource(cfg);

    // --- Collector ---
    let endpoint = CollectorEndpoint::parse(&cfg.otel_exporter_otlp_endpoint)?;
    endpoint
        .probe(CONNECT_TIMEOUT)
        .await
        .context("failed to establish connection to OTLP collector")?;

    // --- Tracing pipeline ---
    global::set_text_map_propagator(TraceContextPropagator::new());

    let tracer = opentelemetry_otlp::new_pipeline()
        .tracing()
        .with_exporter(
            opentelemetry_otlp::new_exporter()
                .tonic()
                .with_endpoint(endpoint.url()),
        )
        .with_trace_config(
            sdktrace::Config::default()
                .with_resource(resource.clone())
                .with_sampler(Sampler::ParentBased(Box::new(Sampler::TraceIdRatioBased(
                    cfg.otel_traces_sampler_arg,
                )))),
        )
        .install_batch(runtime::Tokio)
        .context("failed to install OTLP tracing pipeline")?;

    // Request spans are `info`; lower levels would pull in exporter-internal spans.
    let otel_layer = tracing_opentelemetry::layer()
        .with_tracer(tracer)
        .with_filter(LevelFilter::INFO);

    tracing_subscriber::registry()
        .with(log_layer)
        .with(otel_layer)
        .try_init()
        .context("failed to initialise tracing subscriber")?;

    global::set_error_handler(|err| warn!(error = %err, "OpenTelemetry error"))
        .context("failed to install OpenTelemetry error handler")?;

    info!(
        collector = %endpoint.authority(),
        sampler_ratio = cfg.otel_traces_sampler_arg,
        "trace pipeline installed"
    );

    // --- Metrics pipeline ---
    let meter_provider = opentelemetry_otlp::new_pipeline()
        .metrics(runtime::Tokio)
        .with_exporter(
            opentelemetry_otlp::new_exporter()
                .tonic()
                .with_endpoint(endpoint.url()),
        )
        .with_resource(resource)
        .with_period(cfg.metric_export_interval())
        .build()
        .context("failed to build OTLP metrics pipeline")?;

    global::set_meter_provider(meter_provider.clone());

    let meter = meter_provider.meter(cfg.otel_service_name.clone());
    let instruments = Arc::new(Instruments::new(&meter));

    info!(
        collector = %endpoint.authority(),
        interval_ms = cfg.otel_metric_export_interval,
        "metrics pipeline installed"
    );

    Ok(Telemetry::new(meter_provider, instruments))
}

/// SDK default resource overlaid with the service's name, version and environment.
pub(crate) fn service_resource(cfg: &Config) -> Resource {
    Resource::default().merge(&Resource::from_schema_url(
        [
            KeyValue::new(SERVICE_NAME, cfg.otel_service_name.clone()),
            KeyValue::new(SERVICE_VERSION, cfg.otel_service_version.clone()),
            KeyValue::new(DEPLOYMENT_ENVIRONMENT, cfg.deployment_environment.clone()),
        ],
        SCHEMA_URL,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use opentelemetry::Key;

    fn cfg() -> Config {
        Config {
            port: 8080,
            otel_service_name: "checkout".into(),
            otel_service_version: "v2.3.4".into(),
            deployment_environment: "staging".into(),
            otel_exporter_otlp_endpoint: "localhost:4317".into(),
            otel_metric_export_interval: 30_000,
            otel_traces_sampler_arg: 1.0,
            log_level: "info".into(),
        }
    }

    fn attr(res: &Resource, key: &'static str) -> Option<String> {
        res.get(Key::from_static_str(key)).map(|v| v.to_string())
    }

    #[test]
    fn resource_carries_service_attributes() {
        let res = service_resource(&cfg());
        assert_eq!(attr(&res, SERVICE_NAME).as_deref(), Some("checkout"));
        assert_eq!(attr(&res, SERVICE_VERSION).as_deref(), Some("v2.3.4"));
        assert_eq!(attr(&res, DEPLOYMENT_ENVIRONMENT).as_deref(), Some("staging"));
        assert_eq!(res.schema_url(), Some(SCHEMA_URL));
    }

    #[test]
    fn resource_keeps_sdk_defaults() {
        let res = service_resource(&cfg());
        assert_eq!(attr(&res, "telemetry.sdk.language").as_deref(), Some("rust"));
    }

    #[tokio::test]
    async fn unreachable_collector_is_fatal() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let cfg = Config {
            otel_exporter_otlp_endpoint: format!("127.0.0.1:{port}"),
            ..cfg()
        };
        let err = init_telemetry(&cfg).await.err().expect("init must fail");
        assert!(format!("{err:#}").contains("OTLP collector"), "{err:#}");
    }

    #[tokio::test]
    async fn invalid_endpoint_is_fatal() {
        let cfg = Config {
            otel_exporter_otlp_endpoint: "ftp://collector:21".into(),
            ..cfg()
        };
        assert!(init_telemetry(&cfg).await.is_err());
    }
}
