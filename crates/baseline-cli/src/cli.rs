//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// baseline - check and remediate host security settings
#[derive(Parser, Debug)]
#[command(name = "baseline")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Engine configuration file
    #[arg(short, long, global = true, env = "BASELINE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Evaluate policies without changing anything
    ///
    /// Each path is a policy file or a directory of `*.toml` policies.
    /// Exits with status 2 when any policy is not compliant.
    Check {
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Remediate policies that are not compliant
    Fix {
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Show what would change without writing
        #[arg(long)]
        dry_run: bool,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Show whether a policy applies to this host, and why
    Applies { policy: PathBuf },

    /// Print the detected host facts
    Facts {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Query or promote snapshot states
    State {
        #[command(subcommand)]
        action: StateAction,
    },
}

/// Snapshot tree selection shared by the state actions
#[derive(clap::Args, Debug, Clone, PartialEq, Eq)]
pub struct SnapshotArgs {
    /// Snapshot tree root
    #[arg(long)]
    pub prefix: PathBuf,

    /// Version tried first (defaults to the host OS version)
    #[arg(long)]
    pub snapshot_version: Option<String>,

    /// State label
    #[arg(long)]
    pub state: String,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum StateAction {
    /// Report which snapshot a file matches
    Check {
        #[command(flatten)]
        snapshot: SnapshotArgs,

        file: PathBuf,
    },

    /// Copy a snapshot's files over the live ones
    Change {
        #[command(flatten)]
        snapshot: SnapshotArgs,

        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}
