//! Request-scoped trace identifiers.
//!
//! The instrumented service inserts a [`TraceIds`] value into each request's
//! extensions before the handler runs, provided the ids are valid. Handlers extract it as
//! `Option<Extension<TraceIds>>` so the same handler works in the plain service,
//! where no identifiers exist.

use std::fmt;

/// Hex-encoded identifiers of the span wrapping the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceIds {
    /// 32 hex chars.
    pub trace_id: String,
    /// 16 hex chars.
    pub span_id: String,
}

impl TraceIds {
    /// Build from already-encoded identifiers.
    pub fn new(trace_id: impl Into<String>, span_id: impl Into<String>) -> Self {
        Self {
            trace_id: trace_id.into(),
            span_id: span_id.into(),
        }
    }

    /// Returns `false` for the all-zero ids produced when tracing is disabled.
    pub fn is_valid(&self) -> bool {
        self.trace_id.bytes().any(|b| b != b'0') && self.span_id.bytes().any(|b| b != b'0')
    }
}

impl fmt::Display for TraceIds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.trace_id, self.span_id)
    }
}
