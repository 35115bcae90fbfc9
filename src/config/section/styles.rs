//! `[styles]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [styles]
//! preprocessor = "scss"              # sass | scss | less | styl
//! entry = "main"                     # compiles {base}/{preprocessor}/main.*
//! output = "app.min.css"
//! dest = "css"                       # relative to paths.base
//! build = "css"                      # relative to paths.build
//! browsers = ["last 10 versions"]    # browserslist query for prefixing
//! source_map = true
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use super::{check_file_name, check_relative};
use crate::config::{ConfigDiagnostics, FieldPath};

/// Stylesheet syntax compiled to plain CSS.
///
/// Exactly one is active per configuration; the name doubles as the
/// source directory under `paths.base`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preprocessor {
    /// Indented Sass syntax.
    Sass,
    /// SCSS syntax.
    Scss,
    /// Less, compiled by the `lessc` CLI.
    Less,
    /// Stylus, compiled by the `stylus` CLI.
    Styl,
}

impl Preprocessor {
    pub const ALL: [Self; 4] = [Self::Sass, Self::Scss, Self::Less, Self::Styl];

    /// Name as written in config, also the source directory name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sass => "sass",
            Self::Scss => "scss",
            Self::Less => "less",
            Self::Styl => "styl",
        }
    }

    /// Source file extension.
    pub const fn extension(self) -> &'static str {
        self.name()
    }

    /// External compiler required by this preprocessor, if any.
    pub const fn external_tool(self) -> Option<&'static str> {
        match self {
            Self::Sass | Self::Scss => None,
            Self::Less => Some("lessc"),
            Self::Styl => Some("stylus"),
        }
    }

    /// Install hint shown when the external compiler is missing.
    const fn install_hint(self) -> &'static str {
        match self {
            Self::Less => "npm install -g less",
            Self::Styl => "npm install -g stylus",
            Self::Sass | Self::Scss => "",
        }
    }
}

impl fmt::Display for Preprocessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Stylesheet task settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StylesConfig {
    /// Active preprocessor.
    pub preprocessor: Preprocessor,

    /// Entry file stem inside the preprocessor directory.
    pub entry: String,

    /// Combined output file name.
    pub output: String,

    /// Destination directory, relative to `paths.base`.
    pub dest: PathBuf,

    /// Release destination, relative to `paths.build`.
    pub build: PathBuf,

    /// Browserslist queries used for vendor prefixing.
    pub browsers: Vec<String>,

    /// Write `<output>.map` next to the stylesheet.
    pub source_map: bool,
}

impl StylesConfig {
    pub const PREPROCESSOR: FieldPath = FieldPath::new("styles.preprocessor");
    pub const ENTRY: FieldPath = FieldPath::new("styles.entry");
    pub const OUTPUT: FieldPath = FieldPath::new("styles.output");
    pub const DEST: FieldPath = FieldPath::new("styles.dest");
    pub const BUILD: FieldPath = FieldPath::new("styles.build");
    pub const BROWSERS: FieldPath = FieldPath::new("styles.browsers");

    pub fn validate_paths(&self, diag: &mut ConfigDiagnostics) {
        check_relative(&self.dest, Self::DEST, diag);
        check_relative(&self.build, Self::BUILD, diag);
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        check_file_name(&self.output, Self::OUTPUT, diag);
        check_file_name(&self.entry, Self::ENTRY, diag);

        if let Some(tool) = self.preprocessor.external_tool()
            && which::which(tool).is_err()
        {
            diag.error_with_hint(
                Self::PREPROCESSOR,
                format!("`{}` requires `{tool}`, which was not found in PATH", self.preprocessor),
                self.preprocessor.install_hint(),
            );
        }

        if let Err(e) = lightningcss::targets::Browsers::from_browserslist(&self.browsers) {
            diag.error(Self::BROWSERS, format!("invalid browserslist query: {e}"));
        }
    }
}

impl Default for StylesConfig {
    fn default() -> Self {
        Self {
            preprocessor: Preprocessor::Scss,
            entry: "main".into(),
            output: "app.min.css".into(),
            dest: "css".into(),
            build: "css".into(),
            browsers: vec!["last 10 versions".into()],
            source_map: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_styles_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.styles.preprocessor, Preprocessor::Scss);
        assert_eq!(config.styles.output, "app.min.css");
        assert_eq!(config.styles.dest, PathBuf::from("css"));
        assert_eq!(config.styles.browsers, vec!["last 10 versions".to_string()]);
        assert!(config.styles.source_map);
    }

    #[test]
    fn test_styles_preprocessor_variants() {
        for p in Preprocessor::ALL {
            let config = test_parse_config(&format!("[styles]\npreprocessor = \"{p}\""));
            assert_eq!(config.styles.preprocessor, p);
        }
    }

    #[test]
    fn test_styles_unknown_preprocessor_is_parse_error() {
        let result = crate::config::PipelineConfig::from_str("[styles]\npreprocessor = \"postcss\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_preprocessor_external_tools() {
        assert_eq!(Preprocessor::Scss.external_tool(), None);
        assert_eq!(Preprocessor::Sass.external_tool(), None);
        assert_eq!(Preprocessor::Less.external_tool(), Some("lessc"));
        assert_eq!(Preprocessor::Styl.external_tool(), Some("stylus"));
    }

    #[test]
    fn test_styles_output_with_separator_rejected() {
        let config = test_parse_config("[styles]\noutput = \"css/app.css\"");
        let mut diag = ConfigDiagnostics::new();
        config.styles.validate(&mut diag);
        assert!(diag.errors().iter().any(|e| e.field == StylesConfig::OUTPUT));
    }

    #[test]
    fn test_styles_default_browsers_valid() {
        let config = test_parse_config("");
        let mut diag = ConfigDiagnostics::new();
        config.styles.validate(&mut diag);
        assert!(!diag.errors().iter().any(|e| e.field == StylesConfig::BROWSERS));
    }
}
