//! Configuration section definitions.
//!
//! | Section     | File          | Purpose                                  |
//! |-------------|---------------|------------------------------------------|
//! | `[paths]`   | `paths.rs`    | Base and release-build directories       |
//! | `[styles]`  | `styles.rs`   | Preprocessor, output name, browsers      |
//! | `[scripts]` | `scripts.rs`  | Ordered script sources, output name      |
//! | `[html]`    | `html.rs`     | Page sources with include directives     |
//! | `[images]`  | `images.rs`   | Image sources and compression            |
//! | `[fonts]`   | `copy.rs`     | Plain copy                               |
//! | `[icons]`   | `copy.rs`     | Plain copy                               |
//! | `[watch]`   | `watch.rs`    | Watched extension lists                  |
//! | `[serve]`   | `serve.rs`    | Dev server and reload channel            |
//! | `[deploy]`  | `deploy.rs`   | rsync target and file selection          |

mod copy;
mod deploy;
mod html;
mod images;
mod paths;
mod scripts;
mod serve;
mod styles;
mod watch;

pub use copy::{FontsConfig, IconsConfig};
pub use deploy::DeployConfig;
pub use html::HtmlConfig;
pub use images::ImagesConfig;
pub use paths::PathsConfig;
pub use scripts::ScriptsConfig;
pub use serve::ServeConfig;
pub use styles::{Preprocessor, StylesConfig};
pub use watch::WatchConfig;

use super::FieldPath;
use super::ConfigDiagnostics;
use std::path::Path;

/// Report an error if a configured path is absolute or escapes its parent.
pub(crate) fn check_relative(path: &Path, field: FieldPath, diag: &mut ConfigDiagnostics) {
    if path.is_absolute() {
        diag.error_with_hint(
            field,
            format!("must be relative, got `{}`", path.display()),
            "paths are resolved against the directory containing pipewright.toml",
        );
    } else if path
        .components()
        .any(|c| matches!(c, std::path::Component::ParentDir))
    {
        diag.error(field, format!("must not contain `..`: `{}`", path.display()));
    }
}

/// Report an error if an output file name is empty or contains a separator.
pub(crate) fn check_file_name(name: &str, field: FieldPath, diag: &mut ConfigDiagnostics) {
    if name.trim().is_empty() {
        diag.error(field, "must not be empty");
    } else if name.contains(['/', '\\']) {
        diag.error(field, format!("must be a plain file name, got `{name}`"));
    }
}
