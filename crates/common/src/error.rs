//! Common error types shared across crates.

use axum::{
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::protocol::ErrorResponse;

/// Top-level per-request error type.
///
/// Variants map to HTTP status codes returned to callers:
/// - [`ServiceError::MethodNotAllowed`] → 405
/// - [`ServiceError::NotFound`] → 404
/// - [`ServiceError::RequestTimeout`] → 408
/// - [`ServiceError::Internal`] → 500
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The path exists but does not accept the request method. Carries the one
    /// method the endpoint does accept, echoed back in the `Allow` header.
    #[error("method not allowed (allowed: {0})")]
    MethodNotAllowed(Method),

    /// No route matches the request path.
    #[error("not found")]
    NotFound,

    /// The handler did not finish within the per-request timeout.
    #[error("request timed out")]
    RequestTimeout,

    /// An unexpected internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Returns the HTTP status code that should be sent for this error.
    pub fn http_status(&self) -> StatusCode {
        match self {
            ServiceError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ServiceError::NotFound => StatusCode::NOT_FOUND,
            ServiceError::RequestTimeout => StatusCode::REQUEST_TIMEOUT,
            ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short machine-readable code used in [`ErrorResponse::code`].
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::MethodNotAllowed(_) => "method_not_allowed",
            ServiceError::NotFound => "not_found",
            ServiceError::RequestTimeout => "request_timeout",
            ServiceError::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.http_status();
        let body = Json(ErrorResponse::new(self.code(), self.to_string()));
        match self {
            ServiceError::MethodNotAllowed(allowed) => {
                (status, [(header::ALLOW, allowed.to_string())], body).into_response()
            }
            _ => (status, body).into_response(),
        }
    }
}
