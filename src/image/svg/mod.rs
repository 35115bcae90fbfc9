//! SVG processing.
//!
//! - [`optimize`]: minification through a usvg parse and re-serialize

mod optimize;

pub use optimize::optimize_svg;
