//! `skillkit plan` command implementation

use crate::context::CliContext;
use crate::error::CliError;
use crate::output::{OutputFormat, print_json};
use colored::Colorize;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct PlanOutput<'a> {
    skill_id: &'a str,
    order: Vec<String>,
}

/// Execute the `skillkit plan` command
pub async fn run(ctx: &CliContext, format: OutputFormat, skill_id: &str) -> Result<(), CliError> {
    let order = ctx.manager.activation_plan(skill_id).await?;

    if format == OutputFormat::Json {
        return print_json(&PlanOutput { skill_id, order });
    }

    println!("{} Activation order for {}", "→".green(), skill_id.cyan());
    println!();
    if order.is_empty() {
        println!("  Nothing to activate.");
        return Ok(());
    }
    for (step, id) in order.iter().enumerate() {
        let marker = if id == skill_id { "●".green() } else { "○".normal() };
        println!("  {:>2}. {} {}", step + 1, marker, id);
    }

    Ok(())
}
