//! In-memory result storage.

pub mod results;
