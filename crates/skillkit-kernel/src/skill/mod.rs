//! 技能契约
//! Skill contracts
//!
//! 每个可激活的能力模块都实现 [`Skill`]。可选扩展通过能力探测获得：
//! Every activatable capability module implements [`Skill`]. Optional extensions are found by
//! capability probing rather than reflection:
//! - [`ProgressiveSkill`]: 三级渐进式加载 / three-level progressive loading
//! - [`ActionExecutor`]: 执行具体动作 / executes domain actions
//!
//! [`Skill::kind`] folds both probes into a [`SkillKind`] that callers pattern-match on.

use crate::context::SkillContext;
use crate::error::{BoxError, SkillResult};
use crate::tool::Tool;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

pub mod action;
pub mod progressive;

pub use action::{ActionExecutor, ActionHandler, ActionParams, ActionRequest};
pub use progressive::{
    InstructionsLoader, ParameterDefinition, ParameterSet, ProgressiveSkill, ResourcesLoader,
    SkillInstructions, SkillResources,
};

// ============================================================================
// 核心技能 trait
// ============================================================================

/// 核心技能 trait
/// Core skill trait
///
/// Identity accessors are cheap and never perform I/O. `load`/`unload` are the skill's own
/// lifecycle hooks; the registry calls them and owns the "activated" bookkeeping.
#[async_trait]
pub trait Skill: Send + Sync {
    /// 唯一标识（注册后不可变）
    /// Unique id, immutable once registered
    fn id(&self) -> &str;

    /// 显示名称
    /// Display name
    fn name(&self) -> &str;

    /// 描述（供 LLM 判断何时使用）
    /// Description the LLM uses to decide when to pick the skill
    fn description(&self) -> &str;

    /// 技能分类
    /// Category
    fn category(&self) -> SkillCategory;

    /// 标签（保持插入顺序）
    /// Tags, in insertion order
    fn tags(&self) -> &[String];

    /// 依赖的技能 ID（有序，可为空）
    /// Ordered ids of the skills this one depends on
    fn dependencies(&self) -> &[String];

    /// 元数据
    /// Metadata
    fn metadata(&self) -> &SkillMetadata;

    /// 加载钩子（可执行 I/O）
    /// Load hook, may perform I/O
    async fn load(&self, ctx: &SkillContext, config: &LoadConfig) -> SkillResult<()>;

    /// 卸载钩子
    /// Unload hook
    async fn unload(&self, ctx: &SkillContext) -> SkillResult<()>;

    /// 是否已加载
    /// Whether the skill considers itself loaded
    async fn is_loaded(&self) -> bool;

    /// 技能提供的工具
    /// Tools contributed by the skill
    fn tools(&self) -> Vec<Arc<dyn Tool>> {
        Vec::new()
    }

    /// 系统提示词
    /// System prompt
    async fn system_prompt(&self) -> String;

    /// 少样本示例
    /// Few-shot examples
    async fn examples(&self) -> Vec<Example>;

    /// 渐进式加载能力探测
    /// Progressive-loading capability probe
    fn as_progressive(&self) -> Option<&dyn ProgressiveSkill> {
        None
    }

    /// 动作执行能力探测
    /// Action-execution capability probe
    fn as_action_executor(&self) -> Option<&dyn ActionExecutor> {
        None
    }

    /// Capability classification derived from the probes.
    fn kind(&self) -> SkillKind {
        match (
            self.as_progressive().is_some(),
            self.as_action_executor().is_some(),
        ) {
            (true, true) => SkillKind::ProgressiveWithActions,
            (true, false) => SkillKind::Progressive,
            _ => SkillKind::Basic,
        }
    }

    /// Level-1 summary shown to the LLM.
    fn summary(&self) -> SkillSummary {
        SkillSummary {
            id: self.id().to_string(),
            name: self.name().to_string(),
            description: self.description().to_string(),
            category: self.category(),
            tags: self.tags().to_vec(),
        }
    }

    /// Whether the skill carries `tag`.
    fn has_tag(&self, tag: &str) -> bool {
        self.tags().iter().any(|t| t == tag)
    }
}

/// 生命周期钩子
/// Lifecycle hook supplied by the embedding application
///
/// Both callbacks default to no-ops so implementors override only what they need.
#[async_trait]
pub trait LifecycleHook: Send + Sync {
    /// Called when the skill is activated.
    async fn on_load(&self, ctx: &SkillContext, config: &LoadConfig) -> Result<(), BoxError> {
        let _ = (ctx, config);
        Ok(())
    }

    /// Called when the skill is deactivated.
    async fn on_unload(&self, ctx: &SkillContext) -> Result<(), BoxError> {
        let _ = ctx;
        Ok(())
    }
}

// ============================================================================
// 能力分类
// ============================================================================

/// Capability classification of a skill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillKind {
    /// Only the core contract.
    Basic,
    /// Three-level progressive loading.
    Progressive,
    /// Progressive loading plus action execution.
    ProgressiveWithActions,
}

// ============================================================================
// 技能分类
// ============================================================================

/// 技能分类（封闭枚举）
/// Skill category (closed set)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillCategory {
    Coding,
    DataAnalysis,
    Knowledge,
    Creative,
    Research,
    Automation,
    Communication,
    #[default]
    General,
}

impl SkillCategory {
    /// All categories, in declaration order.
    pub const ALL: [SkillCategory; 8] = [
        Self::Coding,
        Self::DataAnalysis,
        Self::Knowledge,
        Self::Creative,
        Self::Research,
        Self::Automation,
        Self::Communication,
        Self::General,
    ];

    /// Wire name (`snake_case`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Coding => "coding",
            Self::DataAnalysis => "data_analysis",
            Self::Knowledge => "knowledge",
            Self::Creative => "creative",
            Self::Research => "research",
            Self::Automation => "automation",
            Self::Communication => "communication",
            Self::General => "general",
        }
    }
}

impl fmt::Display for SkillCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SkillCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| format!("unknown skill category: {s}"))
    }
}

// ============================================================================
// 加载级别
// ============================================================================

/// 渐进式加载级别
/// Progressive load level
///
/// - Level 1 (~100 bytes/skill): always resident, lets the LLM enumerate options
/// - Level 2 (~2-5 KB/skill): paid only for skills the LLM selects
/// - Level 3 (~10-100 KB/skill): paid at execution time, never enters the LLM context
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum LoadLevel {
    #[default]
    Metadata = 1,
    Instructions = 2,
    Resources = 3,
}

impl LoadLevel {
    /// Numeric level (1..=3).
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for LoadLevel {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Metadata),
            2 => Ok(Self::Instructions),
            3 => Ok(Self::Resources),
            other => Err(format!("invalid load level: {other}")),
        }
    }
}

impl fmt::Display for LoadLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Metadata => write!(f, "metadata"),
            Self::Instructions => write!(f, "instructions"),
            Self::Resources => write!(f, "resources"),
        }
    }
}

// ============================================================================
// 加载配置
// ============================================================================

/// 加载配置
/// Load configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    /// 延迟重量级初始化
    /// Defer heavy initialization
    pub lazy: bool,
    /// 加载时自动解析依赖
    /// Apply `load_with_dependencies` semantics on a plain load
    pub auto_load_dependencies: bool,
    /// 调用方提供的自由键值
    /// Free-form caller-supplied values
    pub context: HashMap<String, serde_json::Value>,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            lazy: true,
            auto_load_dependencies: false,
            context: HashMap::new(),
        }
    }
}

impl LoadConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Materialize heavy state during load instead of on first use.
    pub fn eager(mut self) -> Self {
        self.lazy = false;
        self
    }

    /// Resolve dependencies on a plain load.
    pub fn with_dependencies(mut self) -> Self {
        self.auto_load_dependencies = true;
        self
    }

    pub fn with_context<T: Serialize>(mut self, key: &str, value: T) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.context.insert(key.to_string(), v);
        }
        self
    }

    pub fn get<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.context
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }
}

// ============================================================================
// 元数据
// ============================================================================

/// 技能元数据
/// Skill metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillMetadata {
    /// 版本
    /// Version
    pub version: String,
    /// 作者
    /// Author
    pub author: Option<String>,
    /// 许可证
    /// License
    pub license: Option<String>,
    /// 仓库地址
    /// Repository URL
    pub repository: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// 自定义字段
    /// Free-form extra fields
    #[serde(default)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl Default for SkillMetadata {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            version: "1.0.0".to_string(),
            author: None,
            license: None,
            repository: None,
            created_at: now,
            updated_at: now,
            extra: HashMap::new(),
        }
    }
}

impl SkillMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_license(mut self, license: impl Into<String>) -> Self {
        self.license = Some(license.into());
        self
    }

    pub fn with_repository(mut self, repository: impl Into<String>) -> Self {
        self.repository = Some(repository.into());
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

/// 少样本示例
/// Few-shot example
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Example {
    pub input: String,
    pub output: String,
    /// 推理过程（可选）
    /// Optional reasoning trace
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl Example {
    pub fn new(input: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            ..Default::default()
        }
    }

    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = Some(reasoning.into());
        self
    }
}

/// 第 1 级摘要
/// Level-1 summary of a skill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: SkillCategory,
    pub tags: Vec<String>,
}
