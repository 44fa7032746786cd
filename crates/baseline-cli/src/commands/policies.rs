//! Check and fix command implementations

use std::path::{Path, PathBuf};

use colored::Colorize;

use baseline_core::{ComplianceReport, Policy, PolicyOutcome, Status};

use crate::context::Context;
use crate::error::Result;

fn load_all(paths: &[PathBuf]) -> Result<Vec<(PathBuf, baseline_core::Result<Policy>)>> {
    let files = Policy::discover(paths)?;
    Ok(files
        .into_iter()
        .map(|path| {
            let policy = Policy::load(&path);
            (path, policy)
        })
        .collect())
}

fn unloadable(path: &Path, error: baseline_core::Error) -> PolicyOutcome {
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let status = if error.is_invalid_input() {
        Status::Invalid(error.to_string())
    } else {
        Status::Failed(error.to_string())
    };
    PolicyOutcome::new(name, status).with_source(path)
}

fn run(ctx: &Context, paths: &[PathBuf], fix: Option<bool>, json: bool) -> Result<bool> {
    let engine = ctx.engine();
    let mut report = ComplianceReport::new(ctx.facts.clone());

    for (path, loaded) in load_all(paths)? {
        let outcome = match loaded {
            Ok(policy) => match fix {
                None => engine.check(&policy),
                Some(dry_run) => engine.fix(&policy, dry_run),
            },
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cannot load policy");
                unloadable(&path, e)
            }
        };
        report.push(outcome.with_source(path));
    }

    if json {
        println!("{}", report.to_json()?);
    } else {
        print_report(&report);
    }
    Ok(report.is_compliant())
}

/// Run the check command
pub fn run_check(ctx: &Context, paths: &[PathBuf], json: bool) -> Result<bool> {
    run(ctx, paths, None, json)
}

/// Run the fix command
pub fn run_fix(ctx: &Context, paths: &[PathBuf], dry_run: bool, json: bool) -> Result<bool> {
    if dry_run && !json {
        println!("{} Dry run, nothing will be written", "=>".blue().bold());
    }
    run(ctx, paths, Some(dry_run), json)
}

fn badge(status: &Status) -> colored::ColoredString {
    match status {
        Status::Compliant => "OK".green().bold(),
        Status::NonCompliant => "DRIFT".yellow().bold(),
        Status::NotApplicable => "SKIP".dimmed(),
        Status::Invalid(_) => "INVALID".red().bold(),
        Status::Failed(_) => "FAILED".red().bold(),
    }
}

fn reason(status: &Status) -> Option<&str> {
    match status {
        Status::Invalid(r) | Status::Failed(r) => Some(r),
        _ => None,
    }
}

fn print_report(report: &ComplianceReport) {
    for outcome in &report.outcomes {
        println!("{} {}", badge(&outcome.status), outcome.policy.bold());
        if let Some(note) = outcome.note.as_deref().or(reason(&outcome.status)) {
            println!("   {}", note.dimmed());
        }
        for check in &outcome.checks {
            println!(
                "   {} {} {}",
                badge(&check.status),
                check.kind.dimmed(),
                check.target.cyan()
            );
            if let Some(r) = reason(&check.status) {
                println!("      {r}");
            }
            for detail in &check.details {
                for line in detail.lines() {
                    println!("      {line}");
                }
            }
        }
    }

    let s = report.summary();
    println!();
    println!(
        "{} compliant, {} non-compliant, {} not applicable, {} invalid, {} failed",
        s.compliant.to_string().green(),
        s.non_compliant.to_string().yellow(),
        s.not_applicable,
        s.invalid.to_string().red(),
        s.failed.to_string().red()
    );
}
