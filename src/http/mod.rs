//! HTTP surface of the audit service.

pub mod handlers;
pub mod routes;

pub use routes::{build_app, build_router, AppState};
