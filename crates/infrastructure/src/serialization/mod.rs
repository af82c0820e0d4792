//! Deterministic JSON for files written by the client.
//!
//! Two-space indentation and a trailing newline, so session and config files
//! stay readable and diff cleanly.

mod json;

pub use json::*;
