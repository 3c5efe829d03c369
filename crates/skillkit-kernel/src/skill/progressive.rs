//! 渐进式披露契约
//! Progressive disclosure contracts
//!
//! Level 2 ([`SkillInstructions`]) is what the LLM sees once it selects a skill. Level 3
//! ([`SkillResources`]) is consumed only by the execution path and never enters the LLM
//! context. Both payloads are produced on demand by loaders the embedding application supplies.

use super::{Example, LoadLevel};
use crate::context::SkillContext;
use crate::error::{BoxError, SkillResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

/// 渐进式加载扩展
/// Progressive-loading extension
///
/// Levels only move forward through explicit calls and fall back to
/// [`LoadLevel::Metadata`] on unload.
#[async_trait]
pub trait ProgressiveSkill: Send + Sync {
    /// 加载第 2 级数据（已缓存时直接返回）
    /// Materialize Level 2; returns the cached payload when already present
    async fn load_instructions(&self, ctx: &SkillContext) -> SkillResult<Arc<SkillInstructions>>;

    /// 加载第 3 级数据（已缓存时直接返回）
    /// Materialize Level 3; returns the cached payload when already present
    async fn load_resources(&self, ctx: &SkillContext) -> SkillResult<Arc<SkillResources>>;

    /// 当前级别
    /// Current level
    async fn load_level(&self) -> LoadLevel;

    async fn is_instructions_loaded(&self) -> bool;

    async fn is_resources_loaded(&self) -> bool;
}

// ============================================================================
// 加载器
// ============================================================================

/// 第 2 级数据加载器
/// Level-2 loader collaborator
#[async_trait]
pub trait InstructionsLoader: Send + Sync {
    async fn load_instructions(
        &self,
        ctx: &SkillContext,
        skill_id: &str,
    ) -> Result<SkillInstructions, BoxError>;
}

/// 第 3 级数据加载器
/// Level-3 loader collaborator
#[async_trait]
pub trait ResourcesLoader: Send + Sync {
    async fn load_resources(
        &self,
        ctx: &SkillContext,
        skill_id: &str,
    ) -> Result<SkillResources, BoxError>;
}

#[async_trait]
impl<F, Fut> InstructionsLoader for F
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<SkillInstructions, BoxError>> + Send + 'static,
{
    async fn load_instructions(
        &self,
        _ctx: &SkillContext,
        skill_id: &str,
    ) -> Result<SkillInstructions, BoxError> {
        (self)(skill_id.to_string()).await
    }
}

#[async_trait]
impl<F, Fut> ResourcesLoader for F
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<SkillResources, BoxError>> + Send + 'static,
{
    async fn load_resources(
        &self,
        _ctx: &SkillContext,
        skill_id: &str,
    ) -> Result<SkillResources, BoxError> {
        (self)(skill_id.to_string()).await
    }
}

/// A fixed payload acts as its own loader.
#[async_trait]
impl InstructionsLoader for SkillInstructions {
    async fn load_instructions(
        &self,
        _ctx: &SkillContext,
        _skill_id: &str,
    ) -> Result<SkillInstructions, BoxError> {
        Ok(self.clone())
    }
}

#[async_trait]
impl ResourcesLoader for SkillResources {
    async fn load_resources(
        &self,
        _ctx: &SkillContext,
        _skill_id: &str,
    ) -> Result<SkillResources, BoxError> {
        Ok(self.clone())
    }
}

// ============================================================================
// 第 2 级：指令
// ============================================================================

/// 第 2 级数据：指令
/// Level-2 payload: instructions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillInstructions {
    /// 系统提示词
    /// System prompt
    pub system_prompt: String,
    /// 少样本示例（有序）
    /// Ordered few-shot examples
    pub examples: Vec<Example>,
    /// 参数定义
    /// Parameter definitions
    pub parameters: ParameterSet,
    /// 使用指南
    /// Usage guidelines
    pub guidelines: String,
    /// 局限说明
    /// Limitations
    pub limitations: String,
}

impl SkillInstructions {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            ..Default::default()
        }
    }

    pub fn with_example(mut self, example: Example) -> Self {
        self.examples.push(example);
        self
    }

    pub fn with_required_parameter(mut self, parameter: ParameterDefinition) -> Self {
        self.parameters.required.push(parameter);
        self
    }

    pub fn with_optional_parameter(mut self, parameter: ParameterDefinition) -> Self {
        self.parameters.optional.push(parameter);
        self
    }

    pub fn with_guidelines(mut self, guidelines: impl Into<String>) -> Self {
        self.guidelines = guidelines.into();
        self
    }

    pub fn with_limitations(mut self, limitations: impl Into<String>) -> Self {
        self.limitations = limitations.into();
        self
    }
}

/// Required and optional parameters of a skill.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterSet {
    pub required: Vec<ParameterDefinition>,
    pub optional: Vec<ParameterDefinition>,
}

impl ParameterSet {
    pub fn is_empty(&self) -> bool {
        self.required.is_empty() && self.optional.is_empty()
    }

    /// Required parameters whose names are absent from `provided`.
    pub fn missing_required<'a>(
        &'a self,
        provided: &serde_json::Map<String, serde_json::Value>,
    ) -> Vec<&'a str> {
        self.required
            .iter()
            .filter(|p| !provided.contains_key(&p.name))
            .map(|p| p.name.as_str())
            .collect()
    }
}

/// 参数定义
/// Parameter definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterDefinition {
    pub name: String,
    #[serde(rename = "type", default)]
    pub param_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<serde_json::Value>,
    /// Constraint keywords (`min`, `max`, `enum`, `pattern`, ...)
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub constraints: HashMap<String, serde_json::Value>,
}

impl ParameterDefinition {
    pub fn new(
        name: impl Into<String>,
        param_type: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            param_type: param_type.into(),
            description: description.into(),
            ..Default::default()
        }
    }

    pub fn with_default(mut self, value: serde_json::Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn with_example(mut self, value: serde_json::Value) -> Self {
        self.example = Some(value);
        self
    }

    pub fn with_constraint(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.constraints.insert(key.into(), value);
        self
    }
}

// ============================================================================
// 第 3 级：资源
// ============================================================================

/// 第 3 级数据：资源（不进入 LLM 上下文）
/// Level-3 payload: resources, never exposed to the LLM context
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillResources {
    /// 脚本
    /// Named scripts
    pub scripts: HashMap<String, String>,
    /// 模板
    /// Named templates
    pub templates: HashMap<String, String>,
    /// 依赖包名
    /// Dependency package names
    pub packages: Vec<String>,
    /// 配置
    /// Named config blobs
    pub configs: HashMap<String, String>,
    /// 二进制数据
    /// Named binary blobs
    pub data: HashMap<String, Vec<u8>>,
}

impl SkillResources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_script(mut self, name: impl Into<String>, body: impl Into<String>) -> Self {
        self.scripts.insert(name.into(), body.into());
        self
    }

    pub fn with_template(mut self, name: impl Into<String>, body: impl Into<String>) -> Self {
        self.templates.insert(name.into(), body.into());
        self
    }

    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.packages.push(package.into());
        self
    }

    pub fn with_config(mut self, name: impl Into<String>, body: impl Into<String>) -> Self {
        self.configs.insert(name.into(), body.into());
        self
    }

    pub fn with_data(mut self, name: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.data.insert(name.into(), bytes);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
            && self.templates.is_empty()
            && self.packages.is_empty()
            && self.configs.is_empty()
            && self.data.is_empty()
    }

    /// Total size of all blobs in bytes.
    pub fn total_bytes(&self) -> usize {
        let text: usize = self
            .scripts
            .values()
            .chain(self.templates.values())
            .chain(self.configs.values())
            .map(String::len)
            .sum();
        text + self.data.values().map(Vec::len).sum::<usize>()
    }
}
