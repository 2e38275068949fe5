//! Result forwarding.

pub mod webhook;
