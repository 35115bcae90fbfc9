//! `[watch]` section configuration.
//!
//! ```toml
//! [watch]
//! files = ["html", "htm", "txt", "json", "md", "woff2"]   # full reload
//! images = ["jpg", "jpeg", "png", "webp", "svg"]          # re-run images
//! ```

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

/// Extension lists driving the watch rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Extensions whose change triggers a full page reload.
    pub files: Vec<String>,

    /// Extensions whose change re-runs the images task.
    pub images: Vec<String>,
}

impl WatchConfig {
    pub const FILES: FieldPath = FieldPath::new("watch.files");
    pub const IMAGES: FieldPath = FieldPath::new("watch.images");

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        for (field, list) in [(Self::FILES, &self.files), (Self::IMAGES, &self.images)] {
            for ext in list {
                if ext.is_empty() || ext.starts_with('.') || ext.contains(['/', '\\', '*', ',']) {
                    diag.error_with_hint(
                        field,
                        format!("invalid extension `{ext}`"),
                        "list bare extensions, e.g. \"png\"",
                    );
                }
            }
        }
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            files: ["html", "htm", "txt", "json", "md", "woff2"]
                .map(String::from)
                .to_vec(),
            images: ["jpg", "jpeg", "png", "webp", "svg"].map(String::from).to_vec(),
        }
    }
}
