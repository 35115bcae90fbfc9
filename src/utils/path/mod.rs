//! Path utilities.
//!
//! - [`fs`]: normalization and slash rendering (`normalize_path`, `to_slash`)

pub mod fs;

pub use fs::{normalize_path, to_slash};
