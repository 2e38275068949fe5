//! Wire types and document parsing.

pub mod github;
pub mod models;
