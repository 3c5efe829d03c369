use async_trait::async_trait;
use serde_json::Value;
use skillkit_kernel::{SkillContext, Tool, ToolInput, ToolResult};
use std::sync::Arc;
use tokio::sync::RwLock;

/// A mock tool contributed by a test skill
///
/// It returns a stubbed result and tracks the inputs it was called with.
#[derive(Clone)]
pub struct MockTool {
    name: String,
    description: String,
    schema: Value,
    /// Result returned by every call
    pub stubbed_result: Arc<RwLock<ToolResult>>,
    /// All inputs passed to this tool
    pub call_history: Arc<RwLock<Vec<ToolInput>>>,
}

impl MockTool {
    pub fn new(name: &str, description: &str, schema: Value) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            schema,
            stubbed_result: Arc::new(RwLock::new(ToolResult::success_text("mock"))),
            call_history: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub async fn set_result(&self, result: ToolResult) {
        *self.stubbed_result.write().await = result;
    }

    pub async fn history(&self) -> Vec<ToolInput> {
        self.call_history.read().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.call_history.read().await.len()
    }
}

#[async_trait]
impl Tool for MockTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters_schema(&self) -> Value {
        self.schema.clone()
    }

    async fn execute(&self, input: ToolInput, _ctx: &SkillContext) -> ToolResult {
        self.call_history.write().await.push(input);
        self.stubbed_result.read().await.clone()
    }
}

#[macro_export]
macro_rules! assert_tool_called {
    ($tool:expr, $expected_count:expr) => {
        let count = $tool.call_count().await;
        assert_eq!(
            count, $expected_count,
            "Expected tool '{}' to be called {} times, but was called {} times",
            $tool.name(),
            $expected_count,
            count
        );
    };
}
