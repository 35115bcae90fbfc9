//! Shared helpers.
//!
//! - [`exec`]: external tool invocation (`lessc`, `stylus`, `rsync`)
//! - [`mime`]: content types for the dev server
//! - [`path`]: path normalization

pub mod exec;
pub mod mime;
pub mod path;
