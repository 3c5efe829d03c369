//! Manager configuration
//!
//! Deserialized from any format [`skillkit_kernel::config`] supports:
//!
//! ```toml
//! max_dependency_depth = 32
//! event_buffer = 128
//! skills_dirs = ["./skills", "${HOME}/.skillkit/skills"]
//!
//! [default_load]
//! lazy = false
//! ```

use serde::{Deserialize, Serialize};
use skillkit_kernel::LoadConfig;
use std::path::PathBuf;

/// Default limit on dependency chain length.
pub const DEFAULT_MAX_DEPENDENCY_DEPTH: usize = 64;

/// Default capacity of the event channel.
pub const DEFAULT_EVENT_BUFFER: usize = 256;

/// 技能管理器配置
/// Skill manager configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// 依赖链最大深度
    /// Maximum dependency chain length
    pub max_dependency_depth: usize,
    /// 事件通道容量
    /// Event channel capacity
    pub event_buffer: usize,
    /// 默认加载配置
    /// Load options used by callers that do not supply their own
    pub default_load: LoadConfig,
    /// 技能目录（按优先级排序）
    /// Skill directories scanned for `SKILL.md`, highest priority first
    pub skills_dirs: Vec<PathBuf>,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            max_dependency_depth: DEFAULT_MAX_DEPENDENCY_DEPTH,
            event_buffer: DEFAULT_EVENT_BUFFER,
            default_load: LoadConfig::default(),
            skills_dirs: Vec::new(),
        }
    }
}

impl ManagerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_dependency_depth(mut self, depth: usize) -> Self {
        self.max_dependency_depth = depth;
        self
    }

    pub fn with_event_buffer(mut self, capacity: usize) -> Self {
        self.event_buffer = capacity;
        self
    }

    pub fn with_default_load(mut self, config: LoadConfig) -> Self {
        self.default_load = config;
        self
    }

    pub fn with_skills_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.skills_dirs.push(dir.into());
        self
    }
}
