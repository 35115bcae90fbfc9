//! `[scripts]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [scripts]
//! src = ["vendor/jquery.min.js", "js/app.js"]  # concatenated in this order
//! dest = "js"
//! build = ""                                   # release bundle lands in paths.build
//! output = "app.min.js"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::{check_file_name, check_relative};
use crate::config::{ConfigDiagnostics, FieldPath};

/// Script bundle settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptsConfig {
    /// Source files relative to `paths.base`. Order is significant.
    pub src: Vec<PathBuf>,

    /// Destination directory, relative to `paths.base`.
    pub dest: PathBuf,

    /// Release destination, relative to `paths.build`.
    pub build: PathBuf,

    /// Bundle file name.
    pub output: String,
}

impl ScriptsConfig {
    pub const SRC: FieldPath = FieldPath::new("scripts.src");
    pub const DEST: FieldPath = FieldPath::new("scripts.dest");
    pub const BUILD: FieldPath = FieldPath::new("scripts.build");
    pub const OUTPUT: FieldPath = FieldPath::new("scripts.output");

    pub fn validate_paths(&self, diag: &mut ConfigDiagnostics) {
        for src in &self.src {
            check_relative(src, Self::SRC, diag);
        }
        check_relative(&self.dest, Self::DEST, diag);
        check_relative(&self.build, Self::BUILD, diag);
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.src.is_empty() {
            diag.error_with_hint(
                Self::SRC,
                "must list at least one script",
                "src = [\"js/app.js\"]",
            );
        }
        check_file_name(&self.output, Self::OUTPUT, diag);
        let bundle = self.dest.join(&self.output);
        if self.src.iter().any(|s| *s == bundle) {
            diag.error(Self::SRC, "the bundle output must not be one of its own sources");
        }
    }
}

impl Default for ScriptsConfig {
    fn default() -> Self {
        Self {
            src: vec!["js/app.js".into()],
            dest: "js".into(),
            build: PathBuf::new(),
            output: "app.min.js".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_scripts_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.scripts.src, vec![PathBuf::from("js/app.js")]);
        assert_eq!(config.scripts.dest, PathBuf::from("js"));
        assert_eq!(config.scripts.output, "app.min.js");
    }

    #[test]
    fn test_scripts_order_preserved() {
        let config = test_parse_config("[scripts]\nsrc = [\"z.js\", \"a.js\", \"js/app.js\"]");
        assert_eq!(
            config.scripts.src,
            vec![
                PathBuf::from("z.js"),
                PathBuf::from("a.js"),
                PathBuf::from("js/app.js")
            ]
        );
    }

    #[test]
    fn test_scripts_empty_src_rejected() {
        let config = test_parse_config("[scripts]\nsrc = []");
        let mut diag = ConfigDiagnostics::new();
        config.scripts.validate(&mut diag);
        assert!(diag.errors().iter().any(|e| e.field == ScriptsConfig::SRC));
    }

    #[test]
    fn test_scripts_output_as_source_rejected() {
        let config = test_parse_config("[scripts]\nsrc = [\"js/app.min.js\"]");
        let mut diag = ConfigDiagnostics::new();
        config.scripts.validate(&mut diag);
        assert!(diag.has_errors());
    }
}
