//! 动作执行扩展
//! Action-execution extension
//!
//! A skill that implements [`ActionExecutor`] runs domain logic when the meta-tool dispatches an
//! action to it; skills without it get a descriptive acknowledgement instead.

use super::SkillResources;
use crate::context::SkillContext;
use crate::error::{BoxError, SkillResult};
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;

/// Action parameters as received from the tool-calling surface.
pub type ActionParams = serde_json::Map<String, serde_json::Value>;

/// 动作执行能力
/// Action-execution capability
#[async_trait]
pub trait ActionExecutor: Send + Sync {
    async fn execute_action(
        &self,
        ctx: &SkillContext,
        action: &str,
        params: ActionParams,
    ) -> SkillResult<serde_json::Value>;
}

/// 动作请求
/// A single action dispatched to an [`ActionHandler`]
#[derive(Debug, Clone)]
pub struct ActionRequest {
    pub skill_id: String,
    pub action: String,
    pub params: ActionParams,
    /// 第 3 级资源（若技能配置了资源加载器）
    /// Level-3 resources, when the skill has a resources loader
    pub resources: Option<Arc<SkillResources>>,
}

/// 应用提供的动作处理器
/// Application-supplied action handler that entities delegate to
#[async_trait]
pub trait ActionHandler: Send + Sync {
    async fn handle(
        &self,
        ctx: &SkillContext,
        request: ActionRequest,
    ) -> Result<serde_json::Value, BoxError>;
}

#[async_trait]
impl<F, Fut> ActionHandler for F
where
    F: Fn(ActionRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<serde_json::Value, BoxError>> + Send + 'static,
{
    async fn handle(
        &self,
        _ctx: &SkillContext,
        request: ActionRequest,
    ) -> Result<serde_json::Value, BoxError> {
        (self)(request).await
    }
}
