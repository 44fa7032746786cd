//! baseline CLI
//!
//! Evaluates and remediates host security policies.

mod cli;
mod commands;
mod context;
mod error;
mod logging;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands, StateAction};
use context::Context;
use error::{CliError, Result};

/// Exit status when the host is out of compliance.
const EXIT_NON_COMPLIANT: i32 = 2;

fn main() {
    match run() {
        Ok(true) => {}
        Ok(false) => std::process::exit(EXIT_NON_COMPLIANT),
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            std::process::exit(1);
        }
    }
}

fn run() -> Result<bool> {
    let cli = Cli::parse();
    logging::init(cli.verbose).map_err(|e| CliError::Logging(e.to_string()))?;
    tracing::debug!(?cli, "parsed arguments");

    let ctx = Context::load(cli.config.as_deref())?;
    match &cli.command {
        Commands::Check { paths, json } => commands::run_check(&ctx, paths, *json),
        Commands::Fix {
            paths,
            dry_run,
            json,
        } => commands::run_fix(&ctx, paths, *dry_run, *json),
        Commands::Applies { policy } => commands::run_applies(&ctx, policy),
        Commands::Facts { json } => commands::run_facts(&ctx, *json),
        Commands::State { action } => match action {
            StateAction::Check { snapshot, file } => commands::run_state_check(&ctx, snapshot, file),
            StateAction::Change { snapshot, files } => {
                commands::run_state_change(&ctx, snapshot, files)
            }
        },
    }
}
