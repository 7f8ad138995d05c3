//! Router assembly for the plain service.

use axum::Router;
use common::router::{routes, with_fault_handling, REQUEST_TIMEOUT};
use tower_http::{
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
    LatencyUnit,
};
use tracing::Level;

/// Build the application [`Router`]: shared routes plus an access-log layer
/// that emits one `info` event per response with status and latency.
pub fn build() -> Router {
    with_fault_handling(routes(), REQUEST_TIMEOUT)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .latency_unit(LatencyUnit::Seconds),
                ),
        )
}
