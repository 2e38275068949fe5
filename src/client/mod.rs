//! Outbound HTTP clients.

pub mod api;
pub mod catalog;
pub mod github;
pub mod http;
pub mod rotation;
