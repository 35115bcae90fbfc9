//! `[paths]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [paths]
//! base = "app"     # Working tree: sources and dev outputs
//! build = "build"  # Release tree written by `pipewright build`
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

use super::check_relative;
use crate::config::{ConfigDiagnostics, FieldPath};

/// Base and release-build directories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Base directory, also the dev server root.
    pub base: PathBuf,

    /// Release build directory.
    pub build: PathBuf,
}

impl PathsConfig {
    pub const BASE: FieldPath = FieldPath::new("paths.base");
    pub const BUILD: FieldPath = FieldPath::new("paths.build");

    /// Validate raw paths (before normalization).
    pub fn validate_paths(&self, diag: &mut ConfigDiagnostics) {
        check_relative(&self.base, Self::BASE, diag);
        check_relative(&self.build, Self::BUILD, diag);

        // `build` empties this directory before writing the release tree
        let build = lexical(&self.build);
        if build.as_os_str().is_empty() {
            diag.error_with_hint(
                Self::BUILD,
                "must name a subdirectory, not the project root",
                "build = \"build\"",
            );
        } else if lexical(&self.base).starts_with(&build) {
            diag.error(
                Self::BUILD,
                format!(
                    "must not be or contain `paths.base` (`{}`), `build` cleans the whole directory",
                    self.base.display()
                ),
            );
        }
    }
}

/// `path` without `.` components.
fn lexical(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            base: "app".into(),
            build: "build".into(),
        }
    }
}
