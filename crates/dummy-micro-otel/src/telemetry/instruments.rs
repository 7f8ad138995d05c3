//! Request counter and duration histogram.
//!
//! Both instruments are created once from the service meter and shared by every
//! request through [`RequestMetrics`]. The OpenTelemetry handles aggregate
//! internally, so recording needs no locking on the caller's side.

use axum::http::{Method, StatusCode};
use opentelemetry::{
    metrics::{Counter, Histogram, Meter, Unit},
    KeyValue,
};

/// Name of the request counter.
pub const REQUESTS_TOTAL: &str = "http_requests_total";
/// Name of the request duration histogram.
pub const REQUEST_DURATION_SECONDS: &str = "http_request_duration_seconds";

/// What the middleware learned about one finished request.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestObservation {
    pub method: Method,
    /// Request path, used verbatim as the `endpoint` label.
    pub endpoint: String,
    pub status: StatusCode,
    pub duration_secs: f64,
}

/// Sink for per-request metrics.
#[cfg_attr(test, mockall::automock)]
pub trait RequestMetrics: Send + Sync {
    /// Count the request and observe its duration. Called exactly once per request.
    fn record(&self, observation: &RequestObservation);
}

/// OpenTelemetry-backed [`RequestMetrics`].
pub struct Instruments {
    requests_total: Counter<u64>,
    request_duration: Histogram<f64>,
}

impl Instruments {
    /// Create both instruments on `meter`.
    pub fn new(meter: &Meter) -> Self {
        let requests_total = meter
            .u64_counter(REQUESTS_TOTAL)
            .with_description("Total number of HTTP requests")
            .init();

        let request_duration = meter
            .f64_histogram(REQUEST_DURATION_SECONDS)
            .with_description("Duration of HTTP requests")
            .with_unit(Unit::new("s"))
            .init();

        Self {
            requests_total,
            request_duration,
        }
    }
}

impl RequestMetrics for Instruments {
    fn record(&self, observation: &RequestObservation) {
        let method = KeyValue::new("method", observation.method.to_string());
        let endpoint = KeyValue::new("endpoint", observation.endpoint.clone());
        let status = KeyValue::new("status", observation.status.as_u16().to_string());

        self.requests_total
            .add(1, &[method.clone(), endpoint.clone(), status]);
        self.request_duration
            .record(observation.duration_secs, &[method, endpoint]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opentelemetry::metrics::MeterProvider as _;
    use opentelemetry_sdk::{
        metrics::{
            data::{self, ResourceMetrics},
            PeriodicReader, SdkMeterProvider,
        },
        runtime,
        testing::metrics::InMemoryMetricsExporter,
    };
    use std::sync::Arc;

    fn observation(status: StatusCode) -> RequestObservation {
        RequestObservation {
            method: Method::GET,
            endpoint: "/v1/ping".into(),
            status,
            duration_secs: 0.002,
        }
    }

    fn provider(exporter: &InMemoryMetricsExporter) -> SdkMeterProvider {
        let reader = PeriodicReader::builder(exporter.clone(), runtime::Tokio).build();
        SdkMeterProvider::builder().with_reader(reader).build()
    }

    fn has_labels(attributes: &[KeyValue], expected: &[(&str, &str)]) -> bool {
        attributes.len() == expected.len()
            && expected.iter().all(|(key, value)| {
                attributes
                    .iter()
                    .any(|kv| kv.key.as_str() == *key && kv.value.to_string() == *value)
            })
    }

    fn attrs(set: &opentelemetry_sdk::AttributeSet) -> Vec<KeyValue> {
        set.iter()
            .map(|(k, v)| KeyValue::new(k.clone(), v.clone()))
            .collect()
    }

    fn find_metric<'a>(metrics: &'a [ResourceMetrics], name: &str) -> &'a data::Metric {
        metrics
            .iter()
            .flat_map(|rm| &rm.scope_metrics)
            .flat_map(|sm| &sm.metrics)
            .filter(|m| m.name == name)
            .last()
            .unwrap_or_else(|| panic!("metric {name} not exported"))
    }

    fn counter_value(metric: &data::Metric, labels: &[(&str, &str)]) -> Option<u64> {
        let sum = metric.data.as_any().downcast_ref::<data::Sum<u64>>()?;
        sum.data_points
            .iter()
            .find(|dp| has_labels(&attrs(&dp.attributes), labels))
            .map(|dp| dp.value)
    }

    fn histogram_count(metric: &data::Metric, labels: &[(&str, &str)]) -> Option<u64> {
        let hist = metric
            .data
            .as_any()
            .downcast_ref::<data::Histogram<f64>>()?;
        hist.data_points
            .iter()
            .find(|dp| has_labels(&attrs(&dp.attributes), labels))
            .map(|dp| dp.count)
    }

    const PING: &[(&str, &str)] = &[("method", "GET"), ("endpoint", "/v1/ping")];
    const PING_OK: &[(&str, &str)] = &[
        ("method", "GET"),
        ("endpoint", "/v1/ping"),
        ("status", "200"),
    ];
    const PING_405: &[(&str, &str)] = &[
        ("method", "GET"),
        ("endpoint", "/v1/ping"),
        ("status", "405"),
    ];

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn records_labelled_counter_and_histogram() {
        let exporter = InMemoryMetricsExporter::default();
        let provider = provider(&exporter);
        let instruments = Instruments::new(&provider.meter("test"));

        instruments.record(&observation(StatusCode::OK));
        instruments.record(&observation(StatusCode::OK));
        instruments.record(&observation(StatusCode::METHOD_NOT_ALLOWED));

        provider.force_flush().unwrap();
        let metrics = exporter.get_finished_metrics().unwrap();

        let requests = find_metric(&metrics, REQUESTS_TOTAL);
        assert_eq!(counter_value(requests, PING_OK), Some(2));
        assert_eq!(counter_value(requests, PING_405), Some(1));

        let duration = find_metric(&metrics, REQUEST_DURATION_SECONDS);
        assert_eq!(histogram_count(duration, PING), Some(3));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_recording_loses_nothing() {
        let exporter = InMemoryMetricsExporter::default();
        let provider = provider(&exporter);
        let metrics: Arc<dyn RequestMetrics> =
            Arc::new(Instruments::new(&provider.meter("test")));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let metrics = Arc::clone(&metrics);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        metrics.record(&observation(StatusCode::OK));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        metrics.record(&observation(StatusCode::METHOD_NOT_ALLOWED));

        provider.force_flush().unwrap();
        let exported = exporter.get_finished_metrics().unwrap();

        let requests = find_metric(&exported, REQUESTS_TOTAL);
        assert_eq!(counter_value(requests, PING_OK), Some(800));
        assert_eq!(counter_value(requests, PING_405), Some(1));

        let duration = find_metric(&exported, REQUEST_DURATION_SECONDS);
        assert_eq!(histogram_count(duration, PING), Some(801));
    }
}
