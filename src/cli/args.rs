//! Command-line argument parsing for ecofile
//!
//! Provides clap-based CLI with subcommands and verbosity control.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// ecofile - Parse, validate and inspect process-manager ecosystem files
#[derive(Parser, Debug)]
#[command(name = "ecofile")]
#[command(version)]
#[command(about = "Parse, validate and inspect process-manager ecosystem files", long_about = None)]
pub struct Args {
    /// Verbosity level: default (normal), -v (verbose)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress everything except findings and errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Subcommand
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate an ecosystem file
    Check {
        /// Ecosystem file (.json or .toml)
        file: PathBuf,

        /// Environment profile the file will be launched with
        #[arg(long = "env", value_name = "NAME")]
        profile: Option<String>,

        /// Treat unknown fields as errors
        #[arg(long)]
        strict: bool,

        /// Emit the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the launch plan the file expands to
    Show {
        /// Ecosystem file (.json or .toml)
        file: PathBuf,

        /// Environment profile to resolve against
        #[arg(long = "env", value_name = "NAME")]
        profile: Option<String>,

        /// Emit the plan as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print one app's resolved environment
    Env {
        /// Ecosystem file (.json or .toml)
        file: PathBuf,

        /// App name
        #[arg(long)]
        app: String,

        /// Environment profile to overlay
        #[arg(long = "env", value_name = "NAME")]
        profile: Option<String>,
    },

    /// List deployment targets and their lifecycle hooks
    Targets {
        /// Ecosystem file (.json or .toml)
        file: PathBuf,

        /// Emit the targets as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Verbosity level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
}

impl Args {
    /// Get verbosity level based on flags
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else if self.verbose == 0 {
            Verbosity::Normal
        } else {
            Verbosity::Verbose
        }
    }
}

impl Verbosity {
    /// Whether per-file progress lines should be printed
    pub fn show_headers(&self) -> bool {
        !matches!(self, Verbosity::Quiet)
    }

    /// Whether expanded detail (full env maps, argv) should be printed
    pub fn show_detail(&self) -> bool {
        matches!(self, Verbosity::Verbose)
    }
}
