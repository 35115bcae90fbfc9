//! Stylesheet and script transformations.

pub mod media;
pub mod minify;

pub use minify::{CssOptions, minify_css, minify_js};
