use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

use crate::config_file::ToolConfig;
use crate::types::PackageBackend;

/// pkgsvc - check, install, and manage a package's system service
///
/// With no subcommand, prompts for a package name. A missing package is
/// installed and its service started; for an installed package you are asked
/// whether to start, stop, or show the status of its service.
#[derive(Parser, Debug)]
#[command(name = "pkgsvc")]
#[command(version)]
pub struct Cli {
    /// Dry-run mode: skip install/start/stop and show what would run.
    ///
    /// Read-only queries (installed check, file listing, status) still
    /// execute so the preview is realistic.
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Path to a JSON configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Package manager backend (apt, pacman, dnf)
    #[arg(long, global = true)]
    pub backend: Option<PackageBackend>,

    /// Run install/start/stop without sudo (e.g. when already root)
    #[arg(long, global = true)]
    pub no_elevate: bool,

    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Inspect or manage the configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration as JSON
    Show,
    /// Write the effective configuration to a file
    Save {
        /// Destination path
        path: PathBuf,
    },
    /// Validate a configuration file
    Validate {
        /// Path to configuration file to validate
        path: PathBuf,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        <Self as clap::Parser>::parse()
    }

    /// Layer command-line overrides on top of `config`.
    pub fn apply_to(&self, config: &mut ToolConfig) {
        if let Some(backend) = self.backend {
            config.backend = backend;
        }
        if self.no_elevate {
            config.elevate_with = None;
        }
        if self.dry_run {
            config.dry_run = true;
        }
    }

    /// Default tracing filter directive for the requested verbosity.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
