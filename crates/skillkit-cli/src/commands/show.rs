//! `skillkit show` command implementation

use crate::context::CliContext;
use crate::error::CliError;
use crate::output::{OutputFormat, print_json};
use colored::Colorize;
use serde::Serialize;
use skillkit_kernel::{SkillInstructions, SkillSummary};
use std::collections::{BTreeMap, HashMap};

/// Level-3 entries reported by name and size, never by content.
#[derive(Debug, Default, Serialize)]
struct ResourceListing {
    scripts: BTreeMap<String, usize>,
    templates: BTreeMap<String, usize>,
    configs: BTreeMap<String, usize>,
    data: BTreeMap<String, usize>,
    packages: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ShowOutput {
    #[serde(flatten)]
    summary: SkillSummary,
    dependencies: Vec<String>,
    version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    instructions: Option<SkillInstructions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    resources: Option<ResourceListing>,
}

/// Execute the `skillkit show` command
pub async fn run(
    ctx: &CliContext,
    format: OutputFormat,
    skill_id: &str,
    level: u8,
) -> Result<(), CliError> {
    let skill = ctx
        .manager
        .get(skill_id)
        .await
        .ok_or_else(|| skillkit_kernel::SkillError::NotFound(skill_id.to_string()))?;

    let mut output = ShowOutput {
        summary: skill.summary(),
        dependencies: skill.dependencies().to_vec(),
        version: skill.metadata().version.clone(),
        instructions: None,
        resources: None,
    };

    if level >= 2 {
        let progressive = skill.as_progressive().ok_or_else(|| {
            CliError::Other(format!("Skill {skill_id} does not support progressive loading"))
        })?;
        let instructions = progressive.load_instructions(&ctx.skill_ctx).await?;
        output.instructions = Some(instructions.as_ref().clone());

        if level >= 3 {
            let resources = progressive.load_resources(&ctx.skill_ctx).await?;
            let sizes = |m: &HashMap<String, String>| -> BTreeMap<String, usize> {
                m.iter().map(|(k, v)| (k.clone(), v.len())).collect()
            };
            output.resources = Some(ResourceListing {
                scripts: sizes(&resources.scripts),
                templates: sizes(&resources.templates),
                configs: sizes(&resources.configs),
                data: resources
                    .data
                    .iter()
                    .map(|(k, v)| (k.clone(), v.len()))
                    .collect(),
                packages: resources.packages.clone(),
            });
        }
    }

    if format == OutputFormat::Json {
        return print_json(&output);
    }

    print_text(&output);
    Ok(())
}

fn print_text(output: &ShowOutput) {
    let summary = &output.summary;
    println!("{} {} ({})", "→".green(), summary.id.cyan().bold(), summary.name);
    println!();
    println!("  {:<14} {}", "Category:".dimmed(), summary.category);
    println!("  {:<14} {}", "Version:".dimmed(), output.version);
    if !summary.description.is_empty() {
        println!("  {:<14} {}", "Description:".dimmed(), summary.description);
    }
    if !summary.tags.is_empty() {
        println!("  {:<14} {}", "Tags:".dimmed(), summary.tags.join(", "));
    }
    if !output.dependencies.is_empty() {
        println!("  {:<14} {}", "Depends on:".dimmed(), output.dependencies.join(", "));
    }

    if let Some(instructions) = &output.instructions {
        println!();
        println!("{}", "Instructions".bold());
        for line in instructions.system_prompt.lines() {
            println!("  {line}");
        }
        if !instructions.guidelines.is_empty() {
            println!();
            println!("  {} {}", "Guidelines:".dimmed(), instructions.guidelines);
        }
        if !instructions.limitations.is_empty() {
            println!("  {} {}", "Limitations:".dimmed(), instructions.limitations);
        }
        for param in &instructions.parameters.required {
            println!("  {} {} ({})", "required".yellow(), param.name, param.param_type);
        }
        for param in &instructions.parameters.optional {
            println!("  {} {} ({})", "optional".dimmed(), param.name, param.param_type);
        }
        if !instructions.examples.is_empty() {
            println!("  {} {}", "Examples:".dimmed(), instructions.examples.len());
        }
    }

    if let Some(resources) = &output.resources {
        println!();
        println!("{}", "Resources".bold());
        let groups = [
            ("scripts", &resources.scripts),
            ("templates", &resources.templates),
            ("configs", &resources.configs),
            ("data", &resources.data),
        ];
        for (label, entries) in groups {
            for (name, size) in entries {
                println!("  {:<10} {} ({} bytes)", label.dimmed(), name, size);
            }
        }
        if !resources.packages.is_empty() {
            println!("  {:<10} {}", "packages".dimmed(), resources.packages.join(", "));
        }
    }
}
