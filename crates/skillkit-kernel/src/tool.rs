//! 工具组件
//! Tool Component
//!
//! 暴露给 LLM 工具调用层的统一接口。技能通过 [`crate::Skill::tools`] 贡献工具，
//! 元工具（meta-tool）本身也实现该接口。
//! The interface exposed to the LLM tool-calling surface. Skills contribute tools through
//! [`crate::Skill::tools`]; the skill meta-tool implements it too.

use crate::context::SkillContext;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 统一工具 Trait
/// Unified Tool Trait
///
/// # Example
///
/// ```rust,ignore
/// use skillkit_kernel::{SkillContext, Tool, ToolInput, ToolResult};
///
/// struct Echo;
///
/// #[async_trait]
/// impl Tool for Echo {
///     fn name(&self) -> &str { "echo" }
///     fn description(&self) -> &str { "Echo the input back" }
///     fn parameters_schema(&self) -> serde_json::Value {
///         serde_json::json!({ "type": "object", "properties": { "text": { "type": "string" } } })
///     }
///     async fn execute(&self, input: ToolInput, _ctx: &SkillContext) -> ToolResult {
///         ToolResult::success_text(input.get_str("text").unwrap_or_default())
///     }
/// }
/// ```
#[async_trait]
pub trait Tool: Send + Sync {
    /// 工具名称 (唯一标识符)
    /// Tool name (unique identifier)
    fn name(&self) -> &str;

    /// 工具描述 (用于 LLM 理解)
    /// Tool description (for LLM understanding)
    fn description(&self) -> &str;

    /// 参数 JSON Schema
    /// Parameters JSON Schema
    fn parameters_schema(&self) -> serde_json::Value;

    /// 执行工具
    /// Execute tool
    async fn execute(&self, input: ToolInput, ctx: &SkillContext) -> ToolResult;

    /// 转换为 LLM Tool 格式
    /// Convert to LLM Tool format
    fn to_llm_tool(&self) -> LLMTool {
        LLMTool {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// 工具输入
/// Tool Input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInput {
    /// 结构化参数
    /// Structured arguments
    pub arguments: serde_json::Value,
    /// 原始输入 (可选)
    /// Raw input (optional)
    pub raw_input: Option<String>,
}

impl ToolInput {
    /// 从 JSON 参数创建
    /// Create from JSON arguments
    pub fn from_json(arguments: serde_json::Value) -> Self {
        Self {
            arguments,
            raw_input: None,
        }
    }

    /// 从原始字符串创建；可解析为 JSON 时使用解析结果
    /// Create from a raw string; arguments hold the parsed JSON when the string is valid JSON
    pub fn from_raw(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let arguments = serde_json::from_str(&raw)
            .unwrap_or_else(|_| serde_json::Value::String(raw.clone()));
        Self {
            arguments,
            raw_input: Some(raw),
        }
    }

    /// 获取字符串参数
    /// Get string parameter
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).and_then(|v| v.as_str())
    }
}

impl From<serde_json::Value> for ToolInput {
    fn from(v: serde_json::Value) -> Self {
        Self::from_json(v)
    }
}

impl From<&str> for ToolInput {
    fn from(s: &str) -> Self {
        Self::from_raw(s)
    }
}

/// 工具执行结果
/// Tool Execution Result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// 是否成功
    /// Whether successful
    pub success: bool,
    /// 输出内容
    /// Output content
    pub output: serde_json::Value,
    /// 错误信息 (如果失败)
    /// Error message (if failed)
    pub error: Option<String>,
    /// 额外元数据
    /// Additional metadata
    pub metadata: HashMap<String, String>,
}

impl ToolResult {
    /// 创建成功结果
    /// Create success result
    pub fn success(output: serde_json::Value) -> Self {
        Self {
            success: true,
            output,
            error: None,
            metadata: HashMap::new(),
        }
    }

    /// 创建文本成功结果
    /// Create text success result
    pub fn success_text(text: impl Into<String>) -> Self {
        Self::success(serde_json::Value::String(text.into()))
    }

    /// 创建失败结果
    /// Create failure result
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            output: serde_json::Value::Null,
            error: Some(error.into()),
            metadata: HashMap::new(),
        }
    }

    /// 添加元数据
    /// Add metadata
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// 转换为字符串
    /// Convert to string output
    pub fn to_string_output(&self) -> String {
        if self.success {
            match &self.output {
                serde_json::Value::String(s) => s.clone(),
                v => v.to_string(),
            }
        } else {
            format!(
                "Error: {}",
                self.error.as_deref().unwrap_or("Unknown error")
            )
        }
    }
}

/// LLM 工具定义
/// Tool definition submitted to the LLM
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LLMTool {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}
