//! 渐进式技能实体
//! Progressive skill entity
//!
//! 实现三级渐进式加载：
//! Implements three-level progressive loading:
//! - Level 1: identity, always resident
//! - Level 2: [`SkillInstructions`], pulled on first selection and cached
//! - Level 3: [`SkillResources`], pulled on first execution and cached
//!
//! Each loader runs at most once until the next unload. Loaders race against the context's
//! cancellation signal; a cancelled load leaves nothing cached.

use super::descriptor::{SkillDescriptor, descriptor_setters};
use async_trait::async_trait;
use skillkit_kernel::{
    ActionExecutor, ActionHandler, ActionParams, ActionRequest, Example, InstructionsLoader,
    LifecycleHook, LoadConfig, LoadLevel, ProgressiveSkill, ResourcesLoader, Skill,
    SkillCategory, SkillContext, SkillError, SkillInstructions, SkillMetadata, SkillResources,
    SkillResult, Tool,
};
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

#[derive(Debug, Default)]
struct ProgressiveState {
    loaded: bool,
    level: LoadLevel,
    instructions: Option<Arc<SkillInstructions>>,
    resources: Option<Arc<SkillResources>>,
}

impl ProgressiveState {
    fn reset(&mut self) {
        self.loaded = false;
        self.level = LoadLevel::Metadata;
        self.instructions = None;
        self.resources = None;
    }
}

/// 渐进式技能实体
/// Progressive skill entity
///
/// # Example
///
/// ```rust,ignore
/// use skillkit_foundation::ProgressiveSkillEntity;
/// use skillkit_kernel::{SkillCategory, SkillInstructions};
///
/// let skill = ProgressiveSkillEntity::builder("coding")
///     .with_category(SkillCategory::Coding)
///     .with_instructions_loader(|id: String| async move {
///         Ok(SkillInstructions::new(format!("You are the {id} assistant.")))
///     })
///     .build()?;
/// ```
pub struct ProgressiveSkillEntity {
    descriptor: SkillDescriptor,
    instructions_loader: Option<Arc<dyn InstructionsLoader>>,
    resources_loader: Option<Arc<dyn ResourcesLoader>>,
    action_handler: Option<Arc<dyn ActionHandler>>,
    hook: Option<Arc<dyn LifecycleHook>>,
    tools: Vec<Arc<dyn Tool>>,
    state: RwLock<ProgressiveState>,
}

impl ProgressiveSkillEntity {
    pub fn builder(id: impl Into<String>) -> ProgressiveSkillBuilder {
        ProgressiveSkillBuilder::new(id)
    }

    pub fn descriptor(&self) -> &SkillDescriptor {
        &self.descriptor
    }

    fn cancelled(&self, operation: &'static str) -> SkillError {
        SkillError::Cancelled {
            skill_id: self.descriptor.id.clone(),
            operation,
        }
    }

    /// Materialize Level 2 into `state`, reusing the cached payload.
    async fn fetch_instructions(
        &self,
        state: &mut ProgressiveState,
        ctx: &SkillContext,
    ) -> SkillResult<Arc<SkillInstructions>> {
        if let Some(cached) = &state.instructions {
            return Ok(cached.clone());
        }

        let loader = self.instructions_loader.as_ref().ok_or_else(|| {
            SkillError::InvalidConfig(format!(
                "skill {} has no instructions loader",
                self.descriptor.id
            ))
        })?;

        let outcome = tokio::select! {
            biased;
            _ = ctx.cancelled() => None,
            result = loader.load_instructions(ctx, &self.descriptor.id) => Some(result),
        };
        let payload = match outcome {
            None => return Err(self.cancelled("load_instructions")),
            Some(result) => result.map_err(|e| {
                SkillError::loader_failed(&self.descriptor.id, LoadLevel::Instructions, e)
            })?,
        };

        let payload = Arc::new(payload);
        state.instructions = Some(payload.clone());
        state.level = state.level.max(LoadLevel::Instructions);
        debug!("Skill {} instructions loaded", self.descriptor.id);
        Ok(payload)
    }

    /// Materialize Level 3 into `state`, reusing the cached payload.
    async fn fetch_resources(
        &self,
        state: &mut ProgressiveState,
        ctx: &SkillContext,
    ) -> SkillResult<Arc<SkillResources>> {
        if let Some(cached) = &state.resources {
            return Ok(cached.clone());
        }

        let loader = self.resources_loader.as_ref().ok_or_else(|| {
            SkillError::InvalidConfig(format!(
                "skill {} has no resources loader",
                self.descriptor.id
            ))
        })?;

        let outcome = tokio::select! {
            biased;
            _ = ctx.cancelled() => None,
            result = loader.load_resources(ctx, &self.descriptor.id) => Some(result),
        };
        let payload = match outcome {
            None => return Err(self.cancelled("load_resources")),
            Some(result) => result.map_err(|e| {
                SkillError::loader_failed(&self.descriptor.id, LoadLevel::Resources, e)
            })?,
        };

        let payload = Arc::new(payload);
        debug!(
            "Skill {} resources loaded ({} bytes)",
            self.descriptor.id,
            payload.total_bytes()
        );
        state.resources = Some(payload.clone());
        state.level = LoadLevel::Resources;
        Ok(payload)
    }

    /// 已缓存的第 2 级数据（不触发加载）
    /// Cached Level-2 payload, without triggering a load
    pub async fn cached_instructions(&self) -> Option<Arc<SkillInstructions>> {
        self.state.read().await.instructions.clone()
    }

    /// Cached Level-3 payload, without triggering a load.
    pub async fn cached_resources(&self) -> Option<Arc<SkillResources>> {
        self.state.read().await.resources.clone()
    }
}

impl fmt::Debug for ProgressiveSkillEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressiveSkillEntity")
            .field("descriptor", &self.descriptor)
            .field("has_instructions_loader", &self.instructions_loader.is_some())
            .field("has_resources_loader", &self.resources_loader.is_some())
            .field("has_action_handler", &self.action_handler.is_some())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Skill for ProgressiveSkillEntity {
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
        let mut state = self.state.write().await;
        if state.loaded {
            return Err(SkillError::AlreadyLoaded(self.descriptor.id.clone()));
        }

        if let Some(hook) = &self.hook {
            hook.on_load(ctx, config)
                .await
                .map_err(|e| SkillError::load_failed(&self.descriptor.id, e))?;
        }

        if !config.lazy {
            self.fetch_instructions(&mut state, ctx)
                .await
                .map_err(|e| e.into_load_failure(&self.descriptor.id))?;
        }

        state.loaded = true;
        info!(
            "Skill {} loaded at level {}",
            self.descriptor.id, state.level
        );
        Ok(())
    }

    async fn unload(&self, ctx: &SkillContext) -> SkillResult<()> {
        let mut state = self.state.write().await;
        if let Some(hook) = &self.hook {
            hook.on_unload(ctx)
                .await
                .map_err(|e| SkillError::unload_failed(&self.descriptor.id, e))?;
        }
        state.reset();
        debug!("Skill {} payloads released", self.descriptor.id);
        Ok(())
    }

    async fn is_loaded(&self) -> bool {
        self.state.read().await.loaded
    }

    fn tools(&self) -> Vec<Arc<dyn Tool>> {
        self.tools.clone()
    }

    async fn system_prompt(&self) -> String {
        self.state
            .read()
            .await
            .instructions
            .as_ref()
            .map(|i| i.system_prompt.clone())
            .unwrap_or_default()
    }

    async fn examples(&self) -> Vec<Example> {
        self.state
            .read()
            .await
            .instructions
            .as_ref()
            .map(|i| i.examples.clone())
            .unwrap_or_default()
    }

    fn as_progressive(&self) -> Option<&dyn ProgressiveSkill> {
        Some(self)
    }

    fn as_action_executor(&self) -> Option<&dyn ActionExecutor> {
        if self.action_handler.is_some() {
            Some(self)
        } else {
            None
        }
    }
}

#[async_trait]
impl ProgressiveSkill for ProgressiveSkillEntity {
    async fn load_instructions(&self, ctx: &SkillContext) -> SkillResult<Arc<SkillInstructions>> {
        if let Some(cached) = self.cached_instructions().await {
            return Ok(cached);
        }
        let mut state = self.state.write().await;
        self.fetch_instructions(&mut state, ctx).await
    }

    async fn load_resources(&self, ctx: &SkillContext) -> SkillResult<Arc<SkillResources>> {
        if let Some(cached) = self.cached_resources().await {
            return Ok(cached);
        }
        let mut state = self.state.write().await;
        self.fetch_resources(&mut state, ctx).await
    }

    async fn load_level(&self) -> LoadLevel {
        self.state.read().await.level
    }

    async fn is_instructions_loaded(&self) -> bool {
        self.state.read().await.instructions.is_some()
    }

    async fn is_resources_loaded(&self) -> bool {
        self.state.read().await.resources.is_some()
    }
}

#[async_trait]
impl ActionExecutor for ProgressiveSkillEntity {
    async fn execute_action(
        &self,
        ctx: &SkillContext,
        action: &str,
        params: ActionParams,
    ) -> SkillResult<serde_json::Value> {
        let handler = self.action_handler.as_ref().ok_or_else(|| {
            SkillError::InvalidConfig(format!(
                "skill {} has no action handler",
                self.descriptor.id
            ))
        })?;

        let resources = if self.resources_loader.is_some() {
            Some(self.load_resources(ctx).await?)
        } else {
            None
        };

        let request = ActionRequest {
            skill_id: self.descriptor.id.clone(),
            action: action.to_string(),
            params,
            resources,
        };

        let outcome = tokio::select! {
            biased;
            _ = ctx.cancelled() => None,
            result = handler.handle(ctx, request) => Some(result),
        };
        match outcome {
            None => Err(self.cancelled("execute_action")),
            Some(result) => {
                result.map_err(|e| SkillError::action_failed(&self.descriptor.id, action, e))
            }
        }
    }
}

/// 渐进式技能构建器
/// Builder for [`ProgressiveSkillEntity`]
pub struct ProgressiveSkillBuilder {
    descriptor: SkillDescriptor,
    instructions_loader: Option<Arc<dyn InstructionsLoader>>,
    resources_loader: Option<Arc<dyn ResourcesLoader>>,
    action_handler: Option<Arc<dyn ActionHandler>>,
    hook: Option<Arc<dyn LifecycleHook>>,
    tools: Vec<Arc<dyn Tool>>,
}

impl ProgressiveSkillBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        Self::from_descriptor(SkillDescriptor::new(id))
    }

    /// Start from an existing descriptor, e.g. one parsed from `SKILL.md`.
    pub fn from_descriptor(descriptor: SkillDescriptor) -> Self {
        Self {
            descriptor,
            instructions_loader: None,
            resources_loader: None,
            action_handler: None,
            hook: None,
            tools: Vec::new(),
        }
    }

    descriptor_setters!();

    /// 第 2 级加载器
    /// Level-2 loader
    pub fn with_instructions_loader(mut self, loader: impl InstructionsLoader + 'static) -> Self {
        self.instructions_loader = Some(Arc::new(loader));
        self
    }

    /// 第 3 级加载器
    /// Level-3 loader
    pub fn with_resources_loader(mut self, loader: impl ResourcesLoader + 'static) -> Self {
        self.resources_loader = Some(Arc::new(loader));
        self
    }

    /// Fixed Level-2 payload.
    pub fn with_instructions(self, instructions: SkillInstructions) -> Self {
        self.with_instructions_loader(instructions)
    }

    /// Fixed Level-3 payload.
    pub fn with_resources(self, resources: SkillResources) -> Self {
        self.with_resources_loader(resources)
    }

    /// Handler that makes the entity an [`ActionExecutor`].
    pub fn with_action_handler(mut self, handler: impl ActionHandler + 'static) -> Self {
        self.action_handler = Some(Arc::new(handler));
        self
    }

    pub fn build(self) -> SkillResult<ProgressiveSkillEntity> {
        self.descriptor.validate()?;
        Ok(ProgressiveSkillEntity {
            descriptor: self.descriptor,
            instructions_loader: self.instructions_loader,
            resources_loader: self.resources_loader,
            action_handler: self.action_handler,
            hook: self.hook,
            tools: self.tools,
            state: RwLock::new(ProgressiveState::default()),
        })
    }
}
