//! Axum router construction.

use std::{sync::Arc, time::Duration};

use axum::{middleware::from_fn_with_state, Router};
use common::router::{routes, with_fault_handling, REQUEST_TIMEOUT};

use super::middleware;
use crate::telemetry::RequestMetrics;

/// Build the application [`Router`] with instrumentation attached.
pub fn build(metrics: Arc<dyn RequestMetrics>) -> Router {
    with_instrumentation(routes(), metrics, REQUEST_TIMEOUT)
}

/// Wrap `routes` in the instrumentation middleware.
///
/// Panic recovery and the timeout sit inside the middleware, so a panicking
/// handler is recorded as 500 and a timed-out one as 408.
pub fn with_instrumentation(
    routes: Router,
    metrics: Arc<dyn RequestMetrics>,
    timeout: Duration,
) -> Router {
    with_fault_handling(routes, timeout)
        .layer(from_fn_with_state(metrics, middleware::instrument))
}
