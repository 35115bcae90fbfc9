//! `[html]` section configuration.
//!
//! Top-level `*.html` files in `src` are pages; files starting with `_`
//! are partials, only reachable through `//= path` includes.
//!
//! ```toml
//! [html]
//! src = "sections"
//! dest = "pages"
//! build = "pages"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::check_relative;
use crate::config::{ConfigDiagnostics, FieldPath};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HtmlConfig {
    pub src: PathBuf,
    pub dest: PathBuf,
    pub build: PathBuf,
}

impl HtmlConfig {
    pub const SRC: FieldPath = FieldPath::new("html.src");
    pub const DEST: FieldPath = FieldPath::new("html.dest");
    pub const BUILD: FieldPath = FieldPath::new("html.build");

    pub fn validate_paths(&self, diag: &mut ConfigDiagnostics) {
        check_relative(&self.src, Self::SRC, diag);
        check_relative(&self.dest, Self::DEST, diag);
        check_relative(&self.build, Self::BUILD, diag);
        if self.src == self.dest {
            diag.error(Self::DEST, "must differ from `html.src`");
        }
    }
}

impl Default for HtmlConfig {
    fn default() -> Self {
        Self {
            src: "sections".into(),
            dest: "pages".into(),
            build: "pages".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_html_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.html.src, PathBuf::from("sections"));
        assert_eq!(config.html.dest, PathBuf::from("pages"));
    }

    #[test]
    fn test_html_src_equals_dest_rejected() {
        let config = test_parse_config("[html]\nsrc = \"pages\"");
        let mut diag = ConfigDiagnostics::new();
        config.html.validate_paths(&mut diag);
        assert!(diag.has_errors());
    }
}
