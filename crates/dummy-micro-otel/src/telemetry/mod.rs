//! OpenTelemetry setup: traces, metrics and trace-correlated structured logs.
//!
//! Spans and metrics are exported via OTLP/gRPC to the collector named by
//! `OTEL_EXPORTER_OTLP_ENDPOINT`. Logs are JSON on stdout; every request log
//! line carries the `trace_id`/`span_id` of its span.
//!
//! # Telemetry invariants
//!
//! - One request produces one span, one counter increment, one histogram
//!   observation and one log line.
//! - Initialisation runs once per process; the global subscriber rejects a
//!   second install.

pub mod endpoint;
pub mod init;
pub mod instruments;
pub mod propagation;

use std::sync::Arc;

use opentelemetry::global;
use opentelemetry_sdk::metrics::SdkMeterProvider;
use tracing::{error, info};

pub use init::init_telemetry;
pub use instruments::{Instruments, RequestMetrics, RequestObservation};

/// Handles that outlive initialisation: the meter provider to flush on exit and
/// the shared request instruments.
pub struct Telemetry {
    meter_provider: SdkMeterProvider,
    instruments: Arc<Instruments>,
}

impl Telemetry {
    fn new(meter_provider: SdkMeterProvider, instruments: Arc<Instruments>) -> Self {
        Self {
            meter_provider,
            instruments,
        }
    }

    /// The process-wide request metrics sink.
    pub fn metrics(&self) -> Arc<dyn RequestMetrics> {
        self.instruments.clone()
    }

    /// Flush and shut down both pipelines.
    ///
    /// Blocks until buffered spans and metrics are exported; call it off the
    /// async worker threads. Failures are logged only.
    pub fn shutdown(self) {
        if let Err(e) = self.meter_provider.shutdown() {
            error!(error = %e, "Error shutting down meter provider");
        }
        // Trace export failures surface through the OTEL error handler.
        global::shutdown_tracer_provider();
        info!("telemetry shut down");
    }
}
