//! Axum request handlers for all service endpoints.
//!
//! Handlers accept any method and reject the wrong ones themselves, so the
//! rejection is visible on the handler span as `error = "method_not_allowed"`.

use std::any::Any;

use axum::{
    http::{header, Method},
    response::{IntoResponse, Response},
    BoxError, Extension,
};
use tracing::{error, field, info, Span};

use crate::context::TraceIds;
use crate::error::ServiceError;
use crate::protocol::{PurchaseResponse, PING_BODY};

/// `GET /v1/ping` — liveness probe returning `pong\n` as plain text.
#[tracing::instrument(name = "ping_handler", skip_all, fields(error = field::Empty))]
pub async fn ping(
    method: Method,
    trace: Option<Extension<TraceIds>>,
) -> Result<Response, ServiceError> {
    if method != Method::GET {
        Span::current().record("error", "method_not_allowed");
        return Err(ServiceError::MethodNotAllowed(Method::GET));
    }

    info!(trace_id = trace_id(&trace), "Ping endpoint called");

    Ok(([(header::CONTENT_TYPE, "text/plain")], PING_BODY).into_response())
}

/// `POST /v1/purchase` — returns the fixed synthetic purchase as JSON.
#[tracing::instrument(
    name = "purchase_handler",
    skip_all,
    fields(
        error = field::Empty,
        purchase.id = field::Empty,
        purchase.item = field::Empty,
        purchase.amount = field::Empty,
        purchase.status = field::Empty,
    )
)]
pub async fn purchase(
    method: Method,
    trace: Option<Extension<TraceIds>>,
) -> Result<Response, ServiceError> {
    if method != Method::POST {
        Span::current().record("error", "method_not_allowed");
        return Err(ServiceError::MethodNotAllowed(Method::POST));
    }

    let response = PurchaseResponse::completed();

    let span = Span::current();
    span.record("purchase.id", response.id.as_str());
    span.record("purchase.item", response.item.as_str());
    span.record("purchase.amount", response.amount);
    span.record("purchase.status", response.status.as_str());

    info!(
        purchase_id = %response.id,
        amount = response.amount,
        trace_id = trace_id(&trace),
        "Purchase processed"
    );

    let body = response
        .to_body()
        .map_err(|e| ServiceError::Internal(format!("encoding purchase: {e}")))?;
    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}

/// Catch-all 404 handler.
pub async fn not_found() -> ServiceError {
    ServiceError::NotFound
}

/// Maps an error raised by the middleware stack to a response.
///
/// The request timeout is the only fallible layer; anything else is a 500.
pub async fn layer_error(err: BoxError) -> ServiceError {
    if err.is::<tower::timeout::error::Elapsed>() {
        ServiceError::RequestTimeout
    } else {
        ServiceError::Internal(err.to_string())
    }
}

/// Response served in place of a handler that panicked.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic payload");
    error!(panic = detail, "Handler panicked");

    ServiceError::Internal("handler panicked".into()).into_response()
}

fn trace_id(trace: &Option<Extension<TraceIds>>) -> &str {
    trace
        .as_ref()
        .map(|Extension(ids)| ids.trace_id.as_str())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::ErrorResponse;
    use axum::{body::to_bytes, http::StatusCode};

    #[tokio::test]
    async fn ping_rejects_post() {
        match ping(Method::POST, None).await {
            Err(ServiceError::MethodNotAllowed(allowed)) => assert_eq!(allowed, Method::GET),
            other => panic!("expected 405, got {:?}", other.map(|r| r.status())),
        }
    }

    #[tokio::test]
    async fn purchase_rejects_get() {
        let err = purchase(Method::GET, None).await.unwrap_err();
        assert_eq!(err.http_status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn purchase_returns_completed() {
        let ids = TraceIds::new("0af7651916cd43dd8448eb211c80319c", "b7ad6b7169203331");
        let resp = purchase(Method::POST, Some(Extension(ids))).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/json");
        let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], &PurchaseResponse::completed().to_body().unwrap()[..]);
    }

    #[tokio::test]
    async fn elapsed_timeout_maps_to_408() {
        let err = layer_error(Box::new(tower::timeout::error::Elapsed::new())).await;
        assert_eq!(err.http_status(), StatusCode::REQUEST_TIMEOUT);
    }

    #[tokio::test]
    async fn other_layer_errors_map_to_500() {
        let err = layer_error("connection reset".into()).await;
        assert_eq!(err.http_status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn panic_response_is_error_json() {
        let resp = panic_response(Box::new("boom"));
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let err: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(err.code, "internal_error");
    }

    #[test]
    fn trace_id_defaults_to_empty() {
        assert_eq!(trace_id(&None), "");
    }
}
