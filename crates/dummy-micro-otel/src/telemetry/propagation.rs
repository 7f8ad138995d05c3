//! W3C trace-context extraction and trace id lookup for request spans.

use axum::http::HeaderMap;
use common::TraceIds;
use opentelemetry::{global, propagation::Extractor, trace::TraceContextExt, Context};
use tracing_opentelemetry::OpenTelemetrySpanExt;

/// Read-only view of inbound headers for the text-map propagator.
pub struct HeaderExtractor<'a>(pub &'a HeaderMap);

impl Extractor for HeaderExtractor<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.to_str().ok())
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(|k| k.as_str()).collect()
    }
}

/// Remote parent context carried by `traceparent`/`tracestate`, if any.
///
/// Returns an empty context when the headers carry none, which makes the
/// request span a new root.
pub fn extract_parent(headers: &HeaderMap) -> Context {
    global::get_text_map_propagator(|propagator| propagator.extract(&HeaderExtractor(headers)))
}

/// Trace and span id of `span` as exported.
///
/// All zeroes when no OpenTelemetry layer is installed or the span is disabled.
pub fn trace_ids(span: &tracing::Span) -> TraceIds {
    let cx = span.context();
    let otel_span = cx.span();
    let sc = otel_span.span_context();
    TraceIds::new(sc.trace_id().to_string(), sc.span_id().to_string())
}
