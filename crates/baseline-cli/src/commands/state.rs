//! Snapshot state commands

use std::path::{Path, PathBuf};

use colored::Colorize;

use baseline_state::{FileStateManager, default_backup_root};

use crate::cli::SnapshotArgs;
use crate::context::Context;
use crate::error::Result;

fn manager(ctx: &Context, args: &SnapshotArgs) -> FileStateManager {
    let version = args
        .snapshot_version
        .clone()
        .unwrap_or_else(|| ctx.facts.os_version.to_string());
    let mut manager =
        FileStateManager::new(&args.prefix, version).with_mode(ctx.config.state.mode);
    let backup_root = ctx
        .config
        .state
        .backup_root
        .clone()
        .or_else(|| default_backup_root(ctx.facts.is_root));
    if let Some(root) = backup_root {
        manager = manager.with_backup_root(root);
    }
    manager
}

pub fn run_state_check(ctx: &Context, args: &SnapshotArgs, file: &Path) -> Result<bool> {
    let found = manager(ctx, args).is_file_in_known_state(&args.state, file)?;
    match &found.snapshot {
        Some(key) => {
            println!("{} {} matches {}", "OK".green().bold(), file.display(), key);
            Ok(true)
        }
        None => {
            println!(
                "{} {} is in no known {} state",
                "DRIFT".yellow().bold(),
                file.display(),
                args.state
            );
            Ok(false)
        }
    }
}

pub fn run_state_change(ctx: &Context, args: &SnapshotArgs, files: &[PathBuf]) -> Result<bool> {
    let manager = manager(ctx, args);
    let key = manager.key(&args.state);
    for change in manager.change_files_state(&key, files)? {
        if change.copied {
            println!("{} {} from {}", "COPIED".green().bold(), change.target.display(), key);
            if let Some(backup) = &change.backup {
                println!("   backup: {}", backup.display());
            }
        } else {
            println!("{} {} already in {}", "OK".green().bold(), change.target.display(), key);
        }
    }
    Ok(true)
}
