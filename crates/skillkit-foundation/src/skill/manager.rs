//! 技能管理器
//! Skill manager
//!
//! 统一的技能注册中心：注册、激活、依赖解析与查询。
//! The single registry of skills: registration, activation, dependency resolution and queries.
//!
//! All registry state sits behind one async lock. Operations that run skill hooks hold the write
//! lock for the whole operation, so two loads of the same skill can never both run its hook and
//! a dependency cascade sees a graph that cannot change underneath it. Hooks therefore must not
//! call back into the manager.

use super::dependency::{self, SkillMap};
use super::events::SkillEvent;
use crate::config::ManagerConfig;
use parking_lot::Mutex;
use skillkit_kernel::{
    LoadConfig, Skill, SkillCategory, SkillContext, SkillError, SkillResult, SkillSummary, Tool,
};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, error, info, warn};

#[derive(Default)]
struct Registry {
    skills: SkillMap,
    loaded: HashSet<String>,
}

fn sorted_by_id<'a>(skills: impl Iterator<Item = &'a Arc<dyn Skill>>) -> Vec<Arc<dyn Skill>> {
    let mut out: Vec<Arc<dyn Skill>> = skills.cloned().collect();
    out.sort_by(|a, b| a.id().cmp(b.id()));
    out
}

/// 技能管理器
/// Skill manager
///
/// # Example
///
/// ```rust,ignore
/// use skillkit_foundation::{BaseSkill, SkillManager};
/// use skillkit_kernel::{LoadConfig, SkillContext};
///
/// let manager = SkillManager::new();
/// manager.register(BaseSkill::builder("base").build()?).await?;
/// manager
///     .register(BaseSkill::builder("advanced").with_dependency("base").build()?)
///     .await?;
///
/// let ctx = SkillContext::new("session-1");
/// manager
///     .load_with_dependencies(&ctx, "advanced", &LoadConfig::default())
///     .await?;
/// assert!(manager.is_loaded("base").await);
/// ```
pub struct SkillManager {
    registry: RwLock<Registry>,
    config: ManagerConfig,
    /// 事件发送器（首次获取接收器时创建）
    /// Event sender, created when the receiver is taken
    event_tx: Mutex<Option<mpsc::Sender<SkillEvent>>>,
}

impl fmt::Debug for SkillManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SkillManager")
            .field("config", &self.config)
            .field("events_enabled", &self.event_tx.lock().is_some())
            .finish_non_exhaustive()
    }
}

impl Default for SkillManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SkillManager {
    /// 创建新的技能管理器
    /// Create an empty manager with default configuration
    pub fn new() -> Self {
        Self::with_config(ManagerConfig::default())
    }

    pub fn with_config(config: ManagerConfig) -> Self {
        Self {
            registry: RwLock::new(Registry::default()),
            config,
            event_tx: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Load options used when the caller has none of its own.
    pub fn default_load_config(&self) -> &LoadConfig {
        &self.config.default_load
    }

    /// 获取事件接收器（仅第一次调用返回 `Some`）
    /// Take the event receiver; only the first call returns `Some`
    ///
    /// Events are produced only after the receiver has been taken. When the channel is full new
    /// events are dropped with a warning.
    pub fn take_event_receiver(&self) -> Option<mpsc::Receiver<SkillEvent>> {
        let mut tx = self.event_tx.lock();
        if tx.is_some() {
            return None;
        }
        let (sender, receiver) = mpsc::channel(self.config.event_buffer.max(1));
        *tx = Some(sender);
        Some(receiver)
    }

    fn emit(&self, event: SkillEvent) {
        let tx = self.event_tx.lock();
        let Some(sender) = tx.as_ref() else {
            return;
        };
        match sender.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                warn!("Skill event channel full, dropping {:?}", event);
            }
            Err(TrySendError::Closed(event)) => {
                warn!("Skill event receiver dropped, discarding {:?}", event);
            }
        }
    }

    // ========================================================================
    // 注册
    // ========================================================================

    /// 注册技能
    /// Register a skill
    pub async fn register<S: Skill + 'static>(&self, skill: S) -> SkillResult<()> {
        self.register_arc(Arc::new(skill)).await
    }

    /// Register an already shared skill.
    pub async fn register_arc(&self, skill: Arc<dyn Skill>) -> SkillResult<()> {
        let skill_id = skill.id().to_string();
        if skill_id.trim().is_empty() {
            return Err(SkillError::InvalidConfig(
                "skill id must not be empty".to_string(),
            ));
        }

        let mut registry = self.registry.write().await;
        if registry.skills.contains_key(&skill_id) {
            return Err(SkillError::AlreadyRegistered(skill_id));
        }
        registry.skills.insert(skill_id.clone(), skill);
        drop(registry);

        info!("Skill {} registered", skill_id);
        self.emit(SkillEvent::Registered { skill_id });
        Ok(())
    }

    /// 注销技能（已加载时先卸载）
    /// Unregister a skill, unloading it first when it is loaded
    ///
    /// A failed unload leaves the skill registered and loaded. Skills that depend on it are not
    /// checked; see [`SkillManager::dependents_of`].
    pub async fn unregister(&self, ctx: &SkillContext, skill_id: &str) -> SkillResult<()> {
        let mut registry = self.registry.write().await;
        if !registry.skills.contains_key(skill_id) {
            return Err(SkillError::NotFound(skill_id.to_string()));
        }
        if registry.loaded.contains(skill_id) {
            self.unload_locked(&mut registry, ctx, skill_id).await?;
        }
        registry.skills.remove(skill_id);
        drop(registry);

        info!("Skill {} unregistered", skill_id);
        self.emit(SkillEvent::Unregistered {
            skill_id: skill_id.to_string(),
        });
        Ok(())
    }

    // ========================================================================
    // 加载与卸载
    // ========================================================================

    /// 加载技能
    /// Activate a single skill
    ///
    /// Dependencies are not consulted unless `config.auto_load_dependencies` is set, in which
    /// case this behaves like [`SkillManager::load_with_dependencies`].
    pub async fn load(
        &self,
        ctx: &SkillContext,
        skill_id: &str,
        config: &LoadConfig,
    ) -> SkillResult<()> {
        if config.auto_load_dependencies {
            return self.load_with_dependencies(ctx, skill_id, config).await;
        }
        let mut registry = self.registry.write().await;
        self.load_locked(&mut registry, ctx, skill_id, config).await
    }

    /// 加载技能及其依赖
    /// Activate a skill after its transitive dependencies
    ///
    /// The reachable graph is checked for cycles first; on a cycle nothing is activated.
    /// Dependencies that are already loaded are skipped, the rest are activated in post-order
    /// (each dependency before its dependents, each skill at most once). The first failure
    /// aborts the cascade; skills activated before it stay activated.
    pub async fn load_with_dependencies(
        &self,
        ctx: &SkillContext,
        skill_id: &str,
        config: &LoadConfig,
    ) -> SkillResult<()> {
        let mut registry = self.registry.write().await;
        if !registry.skills.contains_key(skill_id) {
            return Err(SkillError::NotFound(skill_id.to_string()));
        }

        dependency::detect_cycle(
            &registry.skills,
            skill_id,
            self.config.max_dependency_depth,
        )?;
        let plan = dependency::activation_order(&registry.skills, &registry.loaded, skill_id)?;
        debug!("Activation plan for {}: {:?}", skill_id, plan);

        for id in &plan {
            if ctx.is_cancelled() {
                return Err(SkillError::Cancelled {
                    skill_id: id.clone(),
                    operation: "load",
                });
            }
            self.load_locked(&mut registry, ctx, id, config).await?;
        }
        // The plan omits a target that was already loaded.
        if plan.last().map(String::as_str) != Some(skill_id) {
            return Err(SkillError::AlreadyLoaded(skill_id.to_string()));
        }
        Ok(())
    }

    async fn load_locked(
        &self,
        registry: &mut Registry,
        ctx: &SkillContext,
        skill_id: &str,
        config: &LoadConfig,
    ) -> SkillResult<()> {
        let skill = registry
            .skills
            .get(skill_id)
            .cloned()
            .ok_or_else(|| SkillError::NotFound(skill_id.to_string()))?;
        if registry.loaded.contains(skill_id) {
            return Err(SkillError::AlreadyLoaded(skill_id.to_string()));
        }

        match skill.load(ctx, config).await {
            Ok(()) => {
                registry.loaded.insert(skill_id.to_string());
                info!("Skill {} loaded", skill_id);
                self.emit(SkillEvent::Loaded {
                    skill_id: skill_id.to_string(),
                });
                Ok(())
            }
            Err(e) => {
                let err = e.into_load_failure(skill_id);
                error!("Failed to load skill {}: {}", skill_id, err);
                self.emit(SkillEvent::LoadFailed {
                    skill_id: skill_id.to_string(),
                    error: err.to_string(),
                });
                Err(err)
            }
        }
    }

    /// 卸载技能
    /// Deactivate a skill
    ///
    /// Dependents are not checked. On hook failure the skill stays loaded.
    pub async fn unload(&self, ctx: &SkillContext, skill_id: &str) -> SkillResult<()> {
        let mut registry = self.registry.write().await;
        self.unload_locked(&mut registry, ctx, skill_id).await
    }

    async fn unload_locked(
        &self,
        registry: &mut Registry,
        ctx: &SkillContext,
        skill_id: &str,
    ) -> SkillResult<()> {
        let skill = registry
            .skills
            .get(skill_id)
            .cloned()
            .ok_or_else(|| SkillError::NotFound(skill_id.to_string()))?;
        if !registry.loaded.contains(skill_id) {
            return Err(SkillError::NotLoaded(skill_id.to_string()));
        }

        skill
            .unload(ctx)
            .await
            .map_err(|e| e.into_unload_failure(skill_id))?;
        registry.loaded.remove(skill_id);
        info!("Skill {} unloaded", skill_id);
        self.emit(SkillEvent::Unloaded {
            skill_id: skill_id.to_string(),
        });
        Ok(())
    }

    /// 卸载所有技能（依赖者优先）
    /// Deactivate every loaded skill, dependents before their dependencies
    ///
    /// Continues past failures and returns the first one.
    pub async fn unload_all(&self, ctx: &SkillContext) -> SkillResult<()> {
        let mut registry = self.registry.write().await;
        let order = dependency::unload_order(&registry.skills, &registry.loaded);

        let mut first_error = None;
        for skill_id in order {
            if let Err(e) = self.unload_locked(&mut registry, ctx, &skill_id).await {
                warn!("Failed to unload skill {}: {}", skill_id, e);
                first_error.get_or_insert(e);
            }
        }
        info!("All skills unloaded");
        first_error.map_or(Ok(()), Err)
    }

    // ========================================================================
    // 查询
    // ========================================================================

    /// 获取技能
    /// Get a skill by id
    pub async fn get(&self, skill_id: &str) -> Option<Arc<dyn Skill>> {
        self.registry.read().await.skills.get(skill_id).cloned()
    }

    /// 所有技能（按 ID 排序）
    /// All registered skills, sorted by id
    pub async fn list(&self) -> Vec<Arc<dyn Skill>> {
        sorted_by_id(self.registry.read().await.skills.values())
    }

    /// 已加载的技能（按 ID 排序）
    /// Loaded skills, sorted by id
    pub async fn list_loaded(&self) -> Vec<Arc<dyn Skill>> {
        let registry = self.registry.read().await;
        sorted_by_id(
            registry
                .skills
                .values()
                .filter(|s| registry.loaded.contains(s.id())),
        )
    }

    /// 按分类查找
    /// Skills in `category`, sorted by id
    pub async fn find_by_category(&self, category: SkillCategory) -> Vec<Arc<dyn Skill>> {
        let registry = self.registry.read().await;
        sorted_by_id(registry.skills.values().filter(|s| s.category() == category))
    }

    /// 按标签查找（命中任一标签即可）
    /// Skills carrying at least one of `tags`, sorted by id
    pub async fn find_by_tags<S: AsRef<str>>(&self, tags: &[S]) -> Vec<Arc<dyn Skill>> {
        let registry = self.registry.read().await;
        sorted_by_id(
            registry
                .skills
                .values()
                .filter(|s| tags.iter().any(|t| s.has_tag(t.as_ref()))),
        )
    }

    pub async fn is_loaded(&self, skill_id: &str) -> bool {
        self.registry.read().await.loaded.contains(skill_id)
    }

    /// Number of registered skills.
    pub async fn count(&self) -> usize {
        self.registry.read().await.skills.len()
    }

    /// Number of loaded skills.
    pub async fn loaded_count(&self) -> usize {
        self.registry.read().await.loaded.len()
    }

    /// 第 1 级摘要（按 ID 排序）
    /// Level-1 summaries of every registered skill, sorted by id
    pub async fn list_summaries(&self) -> Vec<SkillSummary> {
        self.list().await.iter().map(|s| s.summary()).collect()
    }

    /// 生成技能目录提示词
    /// Render the Level-1 catalog for a system prompt
    pub async fn catalog_prompt(&self) -> String {
        let summaries = self.list_summaries().await;
        if summaries.is_empty() {
            return "No skills are available.".to_string();
        }

        let mut prompt = String::from("You have access to the following skills:\n\n");
        for summary in &summaries {
            prompt.push_str(&format!(
                "- {} ({}) [{}]: {}",
                summary.id, summary.name, summary.category, summary.description
            ));
            if !summary.tags.is_empty() {
                prompt.push_str(&format!(" (tags: {})", summary.tags.join(", ")));
            }
            prompt.push('\n');
        }
        prompt.push_str(
            "\nTo use a skill, call the `use_skill` tool with its id as `skill_name`. \
             Its full instructions are returned on first use.\n",
        );
        prompt
    }

    /// 预演激活顺序（不执行任何钩子）
    /// Dry-run of [`SkillManager::load_with_dependencies`]: the skills it would activate, in order
    pub async fn activation_plan(&self, skill_id: &str) -> SkillResult<Vec<String>> {
        let registry = self.registry.read().await;
        if !registry.skills.contains_key(skill_id) {
            return Err(SkillError::NotFound(skill_id.to_string()));
        }
        dependency::detect_cycle(
            &registry.skills,
            skill_id,
            self.config.max_dependency_depth,
        )?;
        dependency::activation_order(&registry.skills, &registry.loaded, skill_id)
    }

    /// Registered skills that declare `skill_id` as a direct dependency, sorted by id.
    pub async fn dependents_of(&self, skill_id: &str) -> Vec<String> {
        let registry = self.registry.read().await;
        dependency::dependents_of(&registry.skills, skill_id)
    }

    /// 已加载技能提供的工具
    /// Tools contributed by loaded skills, grouped by skill id
    pub async fn loaded_tools(&self) -> Vec<Arc<dyn Tool>> {
        self.list_loaded()
            .await
            .iter()
            .flat_map(|s| s.tools())
            .collect()
    }
}
