//! Endpoints, wire types, errors and server bootstrap shared by the `dummy-micro`
//! service variants.

pub mod context;
pub mod error;
pub mod handlers;
pub mod protocol;
pub mod router;
pub mod server;

pub use context::TraceIds;
pub use error::ServiceError;
