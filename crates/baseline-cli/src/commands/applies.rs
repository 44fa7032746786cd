use std::path::Path;

use colored::Colorize;

use baseline_applicability::Applicability;
use baseline_core::Policy;

use crate::context::Context;
use crate::error::Result;

/// Print the applicability decision for one policy.
pub fn run_applies(ctx: &Context, path: &Path) -> Result<bool> {
    let policy = Policy::load(path)?;
    match ctx.engine().applicability(&policy) {
        Applicability::Applies => {
            println!("{} {} applies to this host", "YES".green().bold(), policy.name);
            Ok(true)
        }
        Applicability::NotApplicable(exclusion) => {
            println!("{} {}: {}", "NO".yellow().bold(), policy.name, exclusion);
            Ok(true)
        }
        Applicability::Invalid(reason) => {
            println!("{} {}: {}", "INVALID".red().bold(), policy.name, reason);
            Ok(false)
        }
    }
}
