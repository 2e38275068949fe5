//! Audit rules.

pub mod checks;
