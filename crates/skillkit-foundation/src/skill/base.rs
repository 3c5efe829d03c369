//! 基础技能
//! Basic skill
//!
//! A skill with fixed metadata, a static system prompt and examples. Load and unload only run
//! the optional [`LifecycleHook`] and flip the loaded flag.

use super::descriptor::{SkillDescriptor, descriptor_setters};
use async_trait::async_trait;
use skillkit_kernel::{
    Example, LifecycleHook, LoadConfig, Skill, SkillCategory, SkillContext, SkillError,
    SkillMetadata, SkillResult, Tool,
};
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// 基础技能
/// Basic skill
///
/// # Example
///
/// ```rust,ignore
/// use skillkit_foundation::BaseSkill;
/// use skillkit_kernel::SkillCategory;
///
/// let skill = BaseSkill::builder("code_review")
///     .with_description("Review code for correctness and style")
///     .with_category(SkillCategory::Coding)
///     .with_tags(["review", "quality"])
///     .with_system_prompt("You are a meticulous reviewer.")
///     .build()?;
/// ```
pub struct BaseSkill {
    descriptor: SkillDescriptor,
    system_prompt: String,
    examples: Vec<Example>,
    tools: Vec<Arc<dyn Tool>>,
    hook: Option<Arc<dyn LifecycleHook>>,
    loaded: RwLock<bool>,
}

impl BaseSkill {
    pub fn builder(id: impl Into<String>) -> SkillBuilder {
        SkillBuilder::new(id)
    }

    pub fn descriptor(&self) -> &SkillDescriptor {
        &self.descriptor
    }
}

impl fmt::Debug for BaseSkill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseSkill")
            .field("descriptor", &self.descriptor)
            .field("tools", &self.tools.len())
            .field("has_hook", &self.hook.is_some())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Skill for BaseSkill {
    fn id(&self) -> &str {
        &self.descriptor.id
    }

    fn name(&self) -> &str {
        &self.descriptor.name
    }

    fn description(&self) -> &str {
        &self.descriptor.description
    }

    fn category(&self) -> SkillCategory {
        self.descriptor.category
    }

    fn tags(&self) -> &[String] {
        &self.descriptor.tags
    }

    fn dependencies(&self) -> &[String] {
        &self.descriptor.dependencies
    }

    fn metadata(&self) -> &SkillMetadata {
        &self.descriptor.metadata
    }

    async fn load(&self, ctx: &SkillContext, config: &LoadConfig) -> SkillResult<()> {
        let mut loaded = self.loaded.write().await;
        if *loaded {
            return Err(SkillError::AlreadyLoaded(self.descriptor.id.clone()));
        }
        if let Some(hook) = &self.hook {
            hook.on_load(ctx, config)
                .await
                .map_err(|e| SkillError::load_failed(&self.descriptor.id, e))?;
        }
        *loaded = true;
        debug!("Skill {} load hook completed", self.descriptor.id);
        Ok(())
    }

    async fn unload(&self, ctx: &SkillContext) -> SkillResult<()> {
        let mut loaded = self.loaded.write().await;
        if let Some(hook) = &self.hook {
            hook.on_unload(ctx)
                .await
                .map_err(|e| SkillError::unload_failed(&self.descriptor.id, e))?;
        }
        *loaded = false;
        Ok(())
    }

    async fn is_loaded(&self) -> bool {
        *self.loaded.read().await
    }

    fn tools(&self) -> Vec<Arc<dyn Tool>> {
        self.tools.clone()
    }

    async fn system_prompt(&self) -> String {
        self.system_prompt.clone()
    }

    async fn examples(&self) -> Vec<Example> {
        self.examples.clone()
    }
}

/// 基础技能构建器
/// Builder for [`BaseSkill`]
pub struct SkillBuilder {
    descriptor: SkillDescriptor,
    system_prompt: String,
    examples: Vec<Example>,
    tools: Vec<Arc<dyn Tool>>,
    hook: Option<Arc<dyn LifecycleHook>>,
}

impl SkillBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            descriptor: SkillDescriptor::new(id),
            system_prompt: String::new(),
            examples: Vec::new(),
            tools: Vec::new(),
            hook: None,
        }
    }

    descriptor_setters!();

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn with_example(mut self, example: Example) -> Self {
        self.examples.push(example);
        self
    }

    /// Build the skill; fails with [`SkillError::InvalidConfig`] on an empty id.
    pub fn build(self) -> SkillResult<BaseSkill> {
        self.descriptor.validate()?;
        Ok(BaseSkill {
            descriptor: self.descriptor,
            system_prompt: self.system_prompt,
            examples: self.examples,
            tools: self.tools,
            hook: self.hook,
            loaded: RwLock::new(false),
        })
    }
}
