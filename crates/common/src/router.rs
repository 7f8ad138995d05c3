//! Axum router construction shared by both service variants.

use std::time::Duration;

use axum::{error_handling::HandleErrorLayer, routing::any, Router};
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;

use crate::handlers;

/// Path of the ping endpoint.
pub const PING_PATH: &str = "/v1/ping";
/// Path of the purchase endpoint.
pub const PURCHASE_PATH: &str = "/v1/purchase";

/// Default per-request timeout applied to all routes.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the bare application [`Router`]: both endpoints plus the 404 fallback.
///
/// Each binary layers its own middleware on top.
pub fn routes() -> Router {
    Router::new()
        .route(PING_PATH, any(handlers::ping))
        .route(PURCHASE_PATH, any(handlers::purchase))
        .fallback(handlers::not_found)
}

/// Wrap `routes` with the request timeout and panic recovery.
///
/// A timed-out request is answered with 408 and a panicking handler with 500,
/// both carrying an `ErrorResponse` body. Anything layered on top of the
/// returned router sees those as ordinary responses.
pub fn with_fault_handling(routes: Router, timeout: Duration) -> Router {
    routes
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handlers::layer_error))
                .timeout(timeout),
        )
        .layer(CatchPanicLayer::custom(handlers::panic_response))
}
