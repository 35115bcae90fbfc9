//! Pipeline configuration for `pipewright.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # One file per TOML section
//! ├── types/         # FieldPath, ConfigError, ConfigDiagnostics
//! ├── util.rs        # Config file discovery
//! └── mod.rs         # PipelineConfig (this file)
//! ```
//!
//! The file is optional: every key has a default matching the classic
//! `app/` + `build/` layout. Once loaded the config is never mutated; it
//! is passed around as `&PipelineConfig` or `Arc<PipelineConfig>`.

pub mod section;
pub mod types;
mod util;

use util::find_config_file;

pub use section::{
    DeployConfig, FontsConfig, HtmlConfig, IconsConfig, ImagesConfig, PathsConfig, Preprocessor,
    ScriptsConfig, ServeConfig, StylesConfig, WatchConfig,
};
pub use types::{ConfigDiagnostics, ConfigError, FieldPath};

use crate::{
    cli::{Cli, Commands},
    log,
    task::{Category, Target},
    utils::path::normalize_path,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing pipewright.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Absolute path to the config file, which may not exist (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory, parent of the config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub styles: StylesConfig,

    #[serde(default)]
    pub scripts: ScriptsConfig,

    #[serde(default)]
    pub html: HtmlConfig,

    #[serde(default)]
    pub images: ImagesConfig,

    #[serde(default)]
    pub fonts: FontsConfig,

    #[serde(default)]
    pub icons: IconsConfig,

    #[serde(default)]
    pub watch: WatchConfig,

    #[serde(default)]
    pub serve: ServeConfig,

    #[serde(default)]
    pub deploy: DeployConfig,
}

impl PipelineConfig {
    /// Load configuration from CLI arguments.
    ///
    /// Searches upward from cwd for the config file. Without one, the
    /// defaults apply and the project root is the working directory.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let (mut config, config_path) = match find_config_file(&cli.config) {
            Some(path) => (Self::from_path(&path)?, path),
            None => {
                crate::debug!("config"; "{} not found, using defaults", cli.config.display());
                (Self::default(), cwd.join(&cli.config))
            }
        };

        // Validate raw paths before normalization
        config.validate_paths()?;

        let root = config_path
            .parent()
            .map_or_else(|| cwd.clone(), Path::to_path_buf);
        config.config_path = config_path;
        config.finalize(&root, &cli.command());

        config.validate(&cli.command())?;
        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) =
            Self::parse_with_ignored(&content).map_err(ConfigError::Toml)?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), toml::de::Error> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    /// Resolve root, apply CLI overrides and make the top-level paths absolute.
    fn finalize(&mut self, root: &Path, command: &Commands) {
        self.root = normalize_path(root);
        self.config_path = normalize_path(&self.config_path);
        self.paths.base = normalize_path(&self.root.join(&self.paths.base));
        self.paths.build = normalize_path(&self.root.join(&self.paths.build));

        if let Commands::Dev { serve } | Commands::Browsersync { serve } = command {
            if let Some(port) = serve.port {
                self.serve.port = port;
            }
            if let Some(interface) = serve.interface {
                self.serve.interface = Some(interface);
            }
        }
    }

    // ========================================================================
    // paths
    // ========================================================================

    /// Base directory: sources, dev outputs and dev server root.
    pub fn base(&self) -> &Path {
        &self.paths.base
    }

    /// Release build directory.
    pub fn build_dir(&self) -> &Path {
        &self.paths.build
    }

    /// Directory holding a category's sources.
    ///
    /// Styles read from `{base}/{preprocessor}`; scripts list their own
    /// files, so their source dir is the base itself.
    pub fn source_dir(&self, category: Category) -> PathBuf {
        let base = self.base();
        match category {
            Category::Styles => base.join(self.styles.preprocessor.name()),
            Category::Scripts => base.to_path_buf(),
            Category::Html => base.join(&self.html.src),
            Category::Images => base.join(&self.images.src),
            Category::Fonts => base.join(&self.fonts.src),
            Category::Icons => base.join(&self.icons.src),
        }
    }

    /// Directory a category writes to for the given target.
    pub fn output_dir(&self, category: Category, target: Target) -> PathBuf {
        let (dest, build) = match category {
            Category::Styles => (&self.styles.dest, &self.styles.build),
            Category::Scripts => (&self.scripts.dest, &self.scripts.build),
            Category::Html => (&self.html.dest, &self.html.build),
            Category::Images => (&self.images.dest, &self.images.build),
            Category::Fonts => (&self.fonts.dest, &self.fonts.build),
            Category::Icons => (&self.icons.dest, &self.icons.build),
        };
        match target {
            Target::Dev => self.base().join(dest),
            Target::Release => self.build_dir().join(build),
        }
    }

    /// Script sources in declared order, resolved against base.
    pub fn script_sources(&self) -> Vec<PathBuf> {
        self.scripts.src.iter().map(|p| self.base().join(p)).collect()
    }

    /// Get path relative to the base directory.
    pub fn base_relative<'a>(&self, path: &'a Path) -> &'a Path {
        path.strip_prefix(self.base()).unwrap_or(path)
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Pre-validate paths before normalization.
    ///
    /// Must run before `finalize()`, which turns base and build absolute.
    fn validate_paths(&self) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();

        self.paths.validate_paths(&mut diag);
        self.styles.validate_paths(&mut diag);
        self.scripts.validate_paths(&mut diag);
        self.html.validate_paths(&mut diag);
        self.images.validate_paths(&mut diag);
        self.fonts.validate_paths(&mut diag);
        self.icons.validate_paths(&mut diag);

        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }

    /// Validate configuration for the given command.
    ///
    /// Collects all validation errors and returns them at once.
    pub fn validate(&self, command: &Commands) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();

        self.scripts.validate(&mut diag);
        self.images.validate(&mut diag);
        self.watch.validate(&mut diag);
        self.serve.validate(&mut diag);
        self.deploy.validate(&mut diag);

        self.validate_command_specific(command, &mut diag);

        diag.print_warnings();

        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }

    /// Validate command-specific requirements.
    fn validate_command_specific(&self, command: &Commands, diag: &mut ConfigDiagnostics) {
        if command.compiles_styles() {
            self.styles.validate(diag);
        }
        if let Commands::Deploy { .. } = command {
            self.deploy.validate_remote(diag);
        }
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config with extra TOML appended to an empty document.
/// Panics if there are unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(extra: &str) -> PipelineConfig {
    let (parsed, ignored) = PipelineConfig::parse_with_ignored(extra).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

/// Build a finalized config rooted at `root`, as `load` would.
#[cfg(test)]
pub fn test_config_at(root: &Path, extra: &str) -> PipelineConfig {
    let mut config = test_parse_config(extra);
    config.config_path = root.join("pipewright.toml");
    config.finalize(root, &Commands::Build);
    config
}

// ============================================================================
// tests
// ============================================================================
