use colored::Colorize;

use crate::context::Context;
use crate::error::Result;

pub fn run_facts(ctx: &Context, json: bool) -> Result<bool> {
    let facts = &ctx.facts;
    if json {
        println!("{}", serde_json::to_string_pretty(facts)?);
        return Ok(true);
    }

    println!("{:<12} {}", "family".bold(), facts.family);
    println!("{:<12} {}", "os-type".bold(), facts.os_type);
    println!("{:<12} {}", "os-version".bold(), facts.os_version);
    println!("{:<12} {}", "root".bold(), facts.is_root);
    println!("{:<12} {}", "category".bold(), facts.category);
    Ok(true)
}
