//! 技能执行上下文
//! Skill execution context
//!
//! 在注册中心、生命周期钩子与加载器之间传递的上下文：
//! The context handed from the registry to lifecycle hooks and loaders:
//! - 执行 ID / Agent ID
//! - 通用键值存储
//! - 取消信号（由调用方控制，注册中心本身不施加超时）
//!
//! Cancellation is owned by the caller; the registry never enforces timeouts itself. Hooks and
//! loaders that perform I/O should race their work against [`SkillContext::cancelled`].

use serde::{Serialize, de::DeserializeOwned};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

/// Execution context passed to every skill hook, loader and action.
///
/// Cloning is cheap; clones share the key/value store and the cancellation token.
///
/// # Example
///
/// ```rust,ignore
/// use skillkit_kernel::SkillContext;
///
/// let ctx = SkillContext::new("request-42").with_agent("support-bot");
/// ctx.set("user_id", "u-1").await;
/// let user: Option<String> = ctx.get("user_id").await;
/// ```
#[derive(Debug, Clone)]
pub struct SkillContext {
    /// 执行 ID
    /// Execution id
    pub execution_id: String,
    /// Agent ID (optional)
    pub agent_id: Option<String>,
    /// 共享状态
    /// Shared state
    state: Arc<RwLock<HashMap<String, serde_json::Value>>>,
    /// 取消信号
    /// Cancellation signal
    cancellation: CancellationToken,
}

impl SkillContext {
    /// 创建新的上下文
    /// Create a new context
    pub fn new(execution_id: impl Into<String>) -> Self {
        Self {
            execution_id: execution_id.into(),
            agent_id: None,
            state: Arc::new(RwLock::new(HashMap::new())),
            cancellation: CancellationToken::new(),
        }
    }

    /// Attach the id of the agent driving this execution.
    pub fn with_agent(mut self, agent_id: impl Into<String>) -> Self {
        self.agent_id = Some(agent_id.into());
        self
    }

    /// Use an externally owned cancellation token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// 创建子上下文：独立的状态，继承取消信号
    /// Create a child context with its own state; cancelling the parent cancels the child.
    pub fn child(&self, execution_id: impl Into<String>) -> Self {
        Self {
            execution_id: execution_id.into(),
            agent_id: self.agent_id.clone(),
            state: Arc::new(RwLock::new(HashMap::new())),
            cancellation: self.cancellation.child_token(),
        }
    }

    /// 获取值
    /// Get a value
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let state = self.state.read().await;
        state
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// 设置值
    /// Set a value
    pub async fn set<T: Serialize>(&self, key: &str, value: T) {
        if let Ok(v) = serde_json::to_value(value) {
            let mut state = self.state.write().await;
            state.insert(key.to_string(), v);
        }
    }

    /// 删除值
    /// Remove a value
    pub async fn remove(&self, key: &str) -> Option<serde_json::Value> {
        let mut state = self.state.write().await;
        state.remove(key)
    }

    /// 检查是否存在值
    /// Check whether a key is present
    pub async fn contains(&self, key: &str) -> bool {
        let state = self.state.read().await;
        state.contains_key(key)
    }

    /// 是否已取消
    /// Whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// 触发取消
    /// Request cancellation
    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    /// Future that resolves once cancellation is requested.
    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.cancellation.cancelled()
    }

    /// The underlying token, for wiring into other tokio-aware code.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation
    }
}

impl Default for SkillContext {
    fn default() -> Self {
        Self::new("default")
    }
}
