//! Freshness detection for incremental outputs.

mod mtime;

pub use mtime::needs_update;
