//! SkillKit CLI - Command-line tool for inspecting skill directories

mod cli;
mod commands;
mod context;
mod error;
mod output;

use clap::Parser;
use cli::{Cli, Commands};
use context::CliContext;
use skillkit_foundation::telemetry;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    telemetry::init_tracing(cli.verbose, cli.log_format);

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run_command(cli))
}

async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let ctx = CliContext::initialize(cli.config.as_deref(), &cli.skills_dirs).await?;
    let format = cli.output;

    match cli.command {
        Commands::List {
            category,
            tags,
            prompt,
        } => {
            commands::list::run(&ctx, format, category.as_deref(), &tags, prompt).await?;
        }

        Commands::Show { id, level } => {
            commands::show::run(&ctx, format, &id, level).await?;
        }

        Commands::Plan { id } => {
            commands::plan::run(&ctx, format, &id).await?;
        }
    }

    Ok(())
}
