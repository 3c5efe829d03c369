//! 技能实现
//! Skill implementations
//!
//! - [`SkillManager`]: 注册中心与依赖解析 / registry and dependency resolution
//! - [`BaseSkill`] / [`ProgressiveSkillEntity`]: 技能实体 / skill entities
//! - [`SkillMetaTool`]: 面向 LLM 的元工具 / the LLM-facing meta-tool
//! - [`SkillDiscovery`]: SKILL.md 目录扫描 / SKILL.md directory scanning

pub mod base;
pub mod dependency;
pub mod descriptor;
pub mod discovery;
pub mod events;
pub mod manager;
pub mod meta_tool;
pub mod progressive;

pub use base::{BaseSkill, SkillBuilder};
pub use descriptor::SkillDescriptor;
pub use discovery::{
    DiscoveredSkill, FsInstructionsLoader, FsResourcesLoader, SkillDiscovery, SkillManifest,
    parse_skill_md,
};
pub use events::SkillEvent;
pub use manager::SkillManager;
pub use meta_tool::{MetaToolRequest, MetaToolResponse, SkillMetaTool};
pub use progressive::{ProgressiveSkillBuilder, ProgressiveSkillEntity};
