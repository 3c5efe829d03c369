//! `skillkit list` command implementation

use crate::context::CliContext;
use crate::error::CliError;
use crate::output::{OutputFormat, print_json};
use colored::Colorize;
use skillkit_kernel::{Skill, SkillCategory, SkillSummary};
use std::collections::HashSet;
use std::sync::Arc;

/// Execute the `skillkit list` command
pub async fn run(
    ctx: &CliContext,
    format: OutputFormat,
    category: Option<&str>,
    tags: &[String],
    prompt: bool,
) -> Result<(), CliError> {
    if prompt {
        println!("{}", ctx.manager.catalog_prompt().await);
        return Ok(());
    }

    let category = category
        .map(|c| c.parse::<SkillCategory>().map_err(CliError::ConfigError))
        .transpose()?;
    let summaries = select(ctx, category, tags).await;

    if format == OutputFormat::Json {
        return print_json(&summaries);
    }

    println!("{} Listing skills", "→".green());
    println!();

    if summaries.is_empty() {
        println!("  No skills found.");
        println!();
        println!("  Skills are discovered from directories containing a SKILL.md file.");
        return Ok(());
    }

    for summary in &summaries {
        println!(
            "  {} {} {}",
            summary.id.cyan().bold(),
            format!("[{}]", summary.category).dimmed(),
            summary.name
        );
        if !summary.description.is_empty() {
            println!("      {}", summary.description);
        }
        if !summary.tags.is_empty() {
            println!("      {} {}", "tags:".dimmed(), summary.tags.join(", "));
        }
    }
    println!();
    println!("  {} skill(s)", summaries.len());

    Ok(())
}

/// Apply the category and tag filters; both must match when both are given.
async fn select(
    ctx: &CliContext,
    category: Option<SkillCategory>,
    tags: &[String],
) -> Vec<SkillSummary> {
    let skills: Vec<Arc<dyn Skill>> = match (category, tags.is_empty()) {
        (None, true) => ctx.manager.list().await,
        (Some(category), true) => ctx.manager.find_by_category(category).await,
        (None, false) => ctx.manager.find_by_tags(tags).await,
        (Some(category), false) => {
            let in_category: HashSet<String> = ctx
                .manager
                .find_by_category(category)
                .await
                .iter()
                .map(|s| s.id().to_string())
                .collect();
            ctx.manager
                .find_by_tags(tags)
                .await
                .into_iter()
                .filter(|s| in_category.contains(s.id()))
                .collect()
        }
    };

    skills.iter().map(|s| s.summary()).collect()
}
