//! `[deploy]` section configuration.
//!
//! Files under `paths.base` are uploaded with rsync. A file is selected
//! when it, or one of its parent directories, matches an `include`
//! pattern, and neither it nor any parent matches an `exclude` pattern.
//!
//! # Example
//!
//! ```toml
//! [deploy]
//! hostname = "username@yoursite.com"
//! destination = "yoursite/public_html/"
//! include = ["*.htaccess", "assets", "css", "js", "pages"]
//! exclude = ["**/Thumbs.db", "**/*.DS_Store"]
//! ```

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

/// rsync deployment settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    /// rsync remote, `user@host`.
    pub hostname: String,

    /// Remote directory.
    pub destination: String,

    /// Gitignore-style patterns, relative to `paths.base`.
    pub include: Vec<String>,

    /// Gitignore-style patterns, applied after `include`.
    pub exclude: Vec<String>,
}

impl DeployConfig {
    pub const HOSTNAME: FieldPath = FieldPath::new("deploy.hostname");
    pub const DESTINATION: FieldPath = FieldPath::new("deploy.destination");
    pub const INCLUDE: FieldPath = FieldPath::new("deploy.include");
    pub const EXCLUDE: FieldPath = FieldPath::new("deploy.exclude");

    /// Pattern checks, run for every command.
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.include.is_empty() {
            diag.warn(Self::INCLUDE, "empty, `deploy` would upload nothing");
        }
        for (field, patterns) in [(Self::INCLUDE, &self.include), (Self::EXCLUDE, &self.exclude)] {
            for pattern in patterns {
                if let Err(e) = crate::watch::PatternSet::check_pattern(pattern) {
                    diag.error(field, format!("invalid pattern `{pattern}`: {e}"));
                }
            }
        }
    }

    /// Remote checks, only for the `deploy` command.
    pub fn validate_remote(&self, diag: &mut ConfigDiagnostics) {
        if self.hostname.trim().is_empty() {
            diag.error_with_hint(
                Self::HOSTNAME,
                "required for deploy",
                "hostname = \"user@example.com\"",
            );
        }
        if self.destination.trim().is_empty() {
            diag.error_with_hint(
                Self::DESTINATION,
                "required for deploy",
                "destination = \"example/public_html/\"",
            );
        }
    }

    /// rsync remote argument, `host:destination`.
    pub fn remote(&self) -> String {
        format!("{}:{}", self.hostname, self.destination)
    }
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            hostname: String::new(),
            destination: String::new(),
            include: ["*.htaccess", "assets", "css", "js", "pages"]
                .map(String::from)
                .to_vec(),
            exclude: ["**/Thumbs.db", "**/*.DS_Store"].map(String::from).to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_deploy_defaults() {
        let config = test_parse_config("");
        assert_eq!(
            config.deploy.include,
            vec!["*.htaccess", "assets", "css", "js", "pages"]
        );
        assert_eq!(config.deploy.exclude, vec!["**/Thumbs.db", "**/*.DS_Store"]);
    }

    #[test]
    fn test_deploy_empty_hostname_rejected() {
        let config = test_parse_config("");
        let mut diag = ConfigDiagnostics::new();
        config.deploy.validate_remote(&mut diag);
        assert!(diag.errors().iter().any(|e| e.field == DeployConfig::HOSTNAME));
    }

    #[test]
    fn test_deploy_remote() {
        let config = test_parse_config(
            "[deploy]\nhostname = \"me@example.com\"\ndestination = \"site/public_html/\"",
        );
        let mut diag = ConfigDiagnostics::new();
        config.deploy.validate_remote(&mut diag);
        assert!(!diag.has_errors());
        assert_eq!(config.deploy.remote(), "me@example.com:site/public_html/");
    }

    #[test]
    fn test_deploy_default_patterns_valid() {
        let config = test_parse_config("");
        let mut diag = ConfigDiagnostics::new();
        config.deploy.validate(&mut diag);
        assert!(!diag.has_errors());
    }
}
