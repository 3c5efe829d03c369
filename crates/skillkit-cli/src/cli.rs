//! CLI command definitions using clap

use crate::output::OutputFormat;
use clap::{Parser, Subcommand};
use skillkit_foundation::telemetry::LogFormat;
use std::path::PathBuf;

/// SkillKit CLI - Inspect skills, catalogs and activation plans
#[derive(Parser, Debug)]
#[command(name = "skillkit")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json)
    #[arg(short = 'o', long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    /// Log line format on stderr (text, json)
    #[arg(long, global = true, env = "SKILLKIT_LOG_FORMAT", default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Configuration file path
    #[arg(short = 'c', long, global = true, env = "SKILLKIT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Additional skills directory (repeatable, scanned after configured ones)
    #[arg(short = 'd', long = "skills-dir", global = true)]
    pub skills_dirs: Vec<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List discovered skills
    List {
        /// Only skills in this category
        #[arg(long)]
        category: Option<String>,

        /// Only skills carrying one of these tags (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,

        /// Print the catalog prompt shown to the LLM instead of a listing
        #[arg(long)]
        prompt: bool,
    },

    /// Show a skill up to the given level
    Show {
        /// Skill id
        id: String,

        /// Disclosure level (1 = metadata, 2 = instructions, 3 = resources)
        #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=3))]
        level: u8,
    },

    /// Print the order in which a skill and its dependencies would be activated
    Plan {
        /// Skill id
        id: String,
    },
}
