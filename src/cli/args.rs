//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::net::IpAddr;
use std::path::PathBuf;

/// Front-end asset pipeline: styles, scripts, html, images, live reload, deploy
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path, searched upward from the current directory
    #[arg(short = 'C', long, global = true, default_value = "pipewright.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// subcommands (default: dev)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Invoked command, `dev` when none is given.
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Dev {
            serve: ServeArgs::default(),
        })
    }
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Build html, images, styles and scripts, then serve and watch (default)
    Dev {
        #[command(flatten)]
        serve: ServeArgs,
    },

    /// Serve the base directory with live reload, without building or watching
    #[command(visible_alias = "serve")]
    Browsersync {
        #[command(flatten)]
        serve: ServeArgs,
    },

    /// Clean images, then build styles, scripts and images in order
    Assets,

    /// Compile, prefix and minify stylesheets
    Styles,

    /// Concatenate and minify scripts
    Scripts,

    /// Resolve `//= path` includes in html pages
    Html,

    /// Compress new or changed images
    Images,

    /// Copy fonts
    Fonts,

    /// Copy icons
    Icons,

    /// Remove compressed images
    Cleanimg,

    /// Upload the base directory to the configured host with rsync
    #[command(visible_alias = "d")]
    Deploy {
        /// List the files that would be uploaded without transferring
        #[arg(short = 'n', long)]
        dry_run: bool,
    },

    /// Release build of every category into the build directory
    #[command(visible_alias = "b")]
    Build,
}

impl Commands {
    /// Whether this command runs the styles task (and so needs its tooling).
    pub const fn compiles_styles(&self) -> bool {
        matches!(
            self,
            Self::Dev { .. } | Self::Assets | Self::Styles | Self::Build
        )
    }

    /// Whether this command starts the dev server.
    pub const fn serves(&self) -> bool {
        matches!(self, Self::Dev { .. } | Self::Browsersync { .. })
    }
}

/// Dev server overrides shared by `dev` and `browsersync`.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ServeArgs {
    /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
    #[arg(short, long)]
    pub interface: Option<IpAddr>,

    /// Port number to listen on
    #[arg(short, long)]
    pub port: Option<u16>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_command_defaults_to_dev() {
        let cli = Cli::try_parse_from(["pipewright"]).unwrap();
        assert!(matches!(cli.command(), Commands::Dev { .. }));
    }

    #[test]
    fn test_serve_alias() {
        let cli = Cli::try_parse_from(["pipewright", "serve", "--port", "8080"]).unwrap();
        let Commands::Browsersync { serve } = cli.command() else {
            panic!("expected browsersync");
        };
        assert_eq!(serve.port, Some(8080));
    }

    #[test]
    fn test_deploy_dry_run() {
        let cli = Cli::try_parse_from(["pipewright", "deploy", "--dry-run"]).unwrap();
        assert!(matches!(cli.command(), Commands::Deploy { dry_run: true }));
    }

    #[test]
    fn test_global_flags_after_command() {
        let cli = Cli::try_parse_from(["pipewright", "styles", "--verbose", "-C", "x.toml"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, PathBuf::from("x.toml"));
    }

    #[test]
    fn test_compiles_styles() {
        assert!(Commands::Assets.compiles_styles());
        assert!(Commands::Build.compiles_styles());
        assert!(!Commands::Cleanimg.compiles_styles());
        assert!(!Commands::Deploy { dry_run: false }.compiles_styles());
    }
}
