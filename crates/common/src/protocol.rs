//! Request and response types exchanged with callers.
//!
//! Both service variants serve byte-identical bodies; these types are the single
//! source of those bodies.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Ping endpoint
// ---------------------------------------------------------------------------

/// Body returned by `GET /v1/ping`.
pub const PING_BODY: &str = "pong\n";

// ---------------------------------------------------------------------------
// Purchase endpoint
// ---------------------------------------------------------------------------

/// Successful response body for `POST /v1/purchase`.
///
/// The service has no purchase logic; every call returns [`PurchaseResponse::completed`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseResponse {
    /// Purchase identifier (a fixed UUID).
    pub id: String,
    /// Purchased item name.
    pub item: String,
    /// Charged amount.
    pub amount: f64,
    /// Purchase state, always `"completed"`.
    pub status: String,
    /// Human-readable outcome.
    pub message: String,
}

impl PurchaseResponse {
    /// The fixed synthetic purchase served by the endpoint.
    pub fn completed() -> Self {
        Self {
            id: "123e4567-e89b-12d3-a456-426614174000".into(),
            item: "Sample Product".into(),
            amount: 99.99,
            status: "completed".into(),
            message: "Purchase processed successfully".into(),
        }
    }

    /// Wire encoding: compact JSON followed by a single `\n`.
    pub fn to_body(&self) -> serde_json::Result<Vec<u8>> {
        let mut body = serde_json::to_vec(self)?;
        body.push(b'\n');
        Ok(body)
    }
}

// ---------------------------------------------------------------------------
// Error response
// ---------------------------------------------------------------------------

/// Standard error response body returned on any non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short machine-readable error code (e.g. `"method_not_allowed"`).
    pub code: String,
    /// Human-readable description safe to expose to callers.
    pub message: String,
}

impl ErrorResponse {
    /// Construct an [`ErrorResponse`] from a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}
