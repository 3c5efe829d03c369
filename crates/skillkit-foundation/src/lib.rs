//! SkillKit Foundation
//!
//! 技能运行时的实现层：
//! Implementation layer of the skill runtime:
//!
//! - [`SkillManager`]: registry, activation and dependency resolution
//! - [`BaseSkill`] and [`ProgressiveSkillEntity`]: ready-made skill entities
//! - [`SkillMetaTool`]: the single tool through which the LLM reaches every skill
//! - [`SkillDiscovery`]: `SKILL.md` directory scanning
//! - [`bootstrap`]: config-driven manager construction
//!
//! # Example
//!
//! ```rust,ignore
//! use skillkit_foundation::{ProgressiveSkillEntity, SkillManager, SkillMetaTool, MetaToolRequest};
//! use skillkit_kernel::{SkillCategory, SkillContext, SkillInstructions};
//! use std::sync::Arc;
//!
//! let manager = Arc::new(SkillManager::new());
//! manager
//!     .register(
//!         ProgressiveSkillEntity::builder("coding")
//!             .with_category(SkillCategory::Coding)
//!             .with_description("Write and debug code")
//!             .with_instructions(SkillInstructions::new("You are a senior engineer."))
//!             .build()?,
//!     )
//!     .await?;
//!
//! let tool = SkillMetaTool::new(manager.clone());
//! let ctx = SkillContext::new("session-1");
//! let response = tool.invoke(&ctx, MetaToolRequest::use_skill("coding")).await?;
//! ```

pub mod bootstrap;
pub mod config;
pub mod skill;
pub mod telemetry;

pub use config::ManagerConfig;
pub use skill::*;
