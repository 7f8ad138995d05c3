//! Axum server, routing, and the instrumentation middleware.
//!
//! # Responsibilities
//! - Wrap the shared routes in the instrumentation middleware.
//! - Capture the status each request ends with.

pub mod capture;
pub mod middleware;
pub mod router;
