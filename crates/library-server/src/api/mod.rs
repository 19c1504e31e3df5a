//! JSON HTTP API.

pub mod error;
pub mod handlers;
pub mod routes;

pub use routes::build_router;
