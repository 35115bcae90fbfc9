//! `[images]` section configuration.
//!
//! ```toml
//! [images]
//! src = "assets/images/src"
//! dest = "assets/images/dest"
//! build = "assets/images"
//! jpeg_quality = 85
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::check_relative;
use crate::config::{ConfigDiagnostics, FieldPath};

/// Image compression settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImagesConfig {
    pub src: PathBuf,
    pub dest: PathBuf,
    pub build: PathBuf,

    /// JPEG re-encode quality, 1..=100.
    pub jpeg_quality: u8,
}

impl ImagesConfig {
    pub const SRC: FieldPath = FieldPath::new("images.src");
    pub const DEST: FieldPath = FieldPath::new("images.dest");
    pub const BUILD: FieldPath = FieldPath::new("images.build");
    pub const JPEG_QUALITY: FieldPath = FieldPath::new("images.jpeg_quality");

    pub fn validate_paths(&self, diag: &mut ConfigDiagnostics) {
        check_relative(&self.src, Self::SRC, diag);
        check_relative(&self.dest, Self::DEST, diag);
        check_relative(&self.build, Self::BUILD, diag);
        if self.dest.starts_with(&self.src) || self.src.starts_with(&self.dest) {
            diag.error(Self::DEST, "source and destination must not contain each other");
        }
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if !(1..=100).contains(&self.jpeg_quality) {
            diag.error(
                Self::JPEG_QUALITY,
                format!("must be between 1 and 100, got {}", self.jpeg_quality),
            );
        }
    }
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            src: "assets/images/src".into(),
            dest: "assets/images/dest".into(),
            build: "assets/images".into(),
            jpeg_quality: 85,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_images_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.images.src, PathBuf::from("assets/images/src"));
        assert_eq!(config.images.dest, PathBuf::from("assets/images/dest"));
        assert_eq!(config.images.jpeg_quality, 85);
    }

    #[test]
    fn test_images_quality_out_of_range() {
        let config = test_parse_config("[images]\njpeg_quality = 0");
        let mut diag = ConfigDiagnostics::new();
        config.images.validate(&mut diag);
        assert!(diag.has_errors());
    }

    #[test]
    fn test_images_nested_dest_rejected() {
        let config = test_parse_config("[images]\ndest = \"assets/images/src/out\"");
        let mut diag = ConfigDiagnostics::new();
        config.images.validate_paths(&mut diag);
        assert!(diag.has_errors());
    }
}
