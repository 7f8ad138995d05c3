//! Request instrumentation middleware.
//!
//! Wraps every request, matched or not, in a server span, then records the
//! request counter, the duration histogram and one trace-correlated log line.

use std::{sync::Arc, time::Instant};

use axum::{
    extract::{Request, State},
    http::header::{HOST, USER_AGENT},
    middleware::Next,
    response::Response,
};
use tracing::{field, info, info_span, Instrument, Span};
use tracing_opentelemetry::OpenTelemetrySpanExt;

use super::capture::CapturedStatus;
use crate::telemetry::{propagation, RequestMetrics, RequestObservation};

/// Axum middleware: span → inner handler → span attributes → metrics → log.
pub async fn instrument(
    State(metrics): State<Arc<dyn RequestMetrics>>,
    mut req: Request,
    next: Next,
) -> Response {
    let start = Instant::now();

    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let user_agent = header_str(&req, USER_AGENT).to_owned();

    let span = request_span(&req, &user_agent);
    span.set_parent(propagation::extract_parent(req.headers()));

    // Handlers only see ids that an OpenTelemetry layer actually assigned.
    let ids = propagation::trace_ids(&span);
    if ids.is_valid() {
        req.extensions_mut().insert(ids.clone());
    }

    let mut captured = CapturedStatus::default();
    let response = captured
        .capture(next.run(req).instrument(span.clone()))
        .await;

    let status = captured.status();
    let duration = start.elapsed().as_secs_f64();

    span.record("http.status_code", status.as_u16());
    span.record("http.duration", duration);
    if status.is_server_error() {
        span.record("otel.status_code", "ERROR");
    }
    // Last handle: closing it hands the span to the batch processor.
    drop(span);

    metrics.record(&RequestObservation {
        method: method.clone(),
        endpoint: path.clone(),
        status,
        duration_secs: duration,
    });

    info!(
        method = %method,
        path = %path,
        status = status.as_u16(),
        duration,
        trace_id = %ids.trace_id,
        span_id = %ids.span_id,
        user_agent = %user_agent,
        "HTTP request"
    );

    response
}

/// Server span named `"<METHOD> <PATH>"` with the request attributes attached.
fn request_span(req: &Request, user_agent: &str) -> Span {
    let method = req.method();
    let uri = req.uri();

    let scheme = uri.scheme_str().unwrap_or("http");
    let host = uri
        .authority()
        .map(|a| a.as_str())
        .unwrap_or_else(|| header_str(req, HOST));
    let path_and_query = uri.path_and_query().map_or("/", |pq| pq.as_str());

    info_span!(
        "HTTP request",
        otel.name = %format!("{} {}", method, uri.path()),
        otel.kind = "server",
        otel.status_code = field::Empty,
        http.method = %method,
        http.url = %format!("{scheme}://{host}{path_and_query}"),
        http.scheme = scheme,
        http.host = host,
        http.user_agent = user_agent,
        http.status_code = field::Empty,
        http.duration = field::Empty,
    )
}

fn header_str(req: &Request, name: axum::http::HeaderName) -> &str {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}
