//! 技能元工具
//! Skill meta-tool
//!
//! A single tool the LLM sees instead of one tool per skill. It lists the Level-1 catalog,
//! activates a selected skill, pulls its Level-2 instructions and dispatches actions.

use super::manager::SkillManager;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use skillkit_kernel::{
    ActionParams, LoadConfig, Skill, SkillContext, SkillError, SkillInstructions, SkillResult,
    SkillSummary, Tool, ToolInput, ToolResult,
};
use std::sync::Arc;
use tracing::debug;

/// Default tool name.
pub const META_TOOL_NAME: &str = "use_skill";

/// Action used when the request names none.
pub const DEFAULT_ACTION: &str = "use";

/// 元工具请求
/// Meta-tool request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetaToolRequest {
    /// 列出所有技能
    /// Return the catalog instead of using a skill
    #[serde(default)]
    pub list_skills: bool,
    #[serde(default)]
    pub skill_name: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub params: ActionParams,
}

impl MetaToolRequest {
    pub fn list() -> Self {
        Self {
            list_skills: true,
            ..Default::default()
        }
    }

    pub fn use_skill(skill_name: impl Into<String>) -> Self {
        Self {
            skill_name: Some(skill_name.into()),
            ..Default::default()
        }
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.params.insert(key.into(), value);
        self
    }
}

/// 元工具响应
/// Meta-tool response
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MetaToolResponse {
    /// Level-1 catalog.
    Catalog { skills: Vec<SkillSummary> },
    /// The skill executed the action.
    Executed {
        skill_id: String,
        action: String,
        result: serde_json::Value,
        #[serde(skip_serializing_if = "Option::is_none")]
        instructions: Option<SkillInstructions>,
    },
    /// The skill has no action executor; the LLM should follow its instructions.
    Acknowledged {
        skill_id: String,
        action: String,
        params: ActionParams,
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        instructions: Option<SkillInstructions>,
    },
}

impl MetaToolResponse {
    /// Skill the response is about; `None` for the catalog.
    pub fn skill_id(&self) -> Option<&str> {
        match self {
            Self::Catalog { .. } => None,
            Self::Executed { skill_id, .. } | Self::Acknowledged { skill_id, .. } => {
                Some(skill_id)
            }
        }
    }
}

/// 技能元工具
/// Skill meta-tool
///
/// Only Level-2 data ever reaches the response; Level-3 resources stay inside action handlers.
pub struct SkillMetaTool {
    manager: Arc<SkillManager>,
    name: String,
    description: String,
    load_config: LoadConfig,
}

impl SkillMetaTool {
    pub fn new(manager: Arc<SkillManager>) -> Self {
        let load_config = manager.default_load_config().clone();
        Self {
            manager,
            name: META_TOOL_NAME.to_string(),
            description: "Use one of the available skills. Call with {\"list_skills\": true} to \
                          see them, or with {\"skill_name\": \"<id>\"} to activate a skill and \
                          receive its instructions. An optional \"action\" and \"params\" are \
                          passed to skills that execute actions."
                .to_string(),
            load_config,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Load options used when the meta-tool activates a skill.
    pub fn with_load_config(mut self, config: LoadConfig) -> Self {
        self.load_config = config;
        self
    }

    /// 处理请求
    /// Handle a typed request
    pub async fn invoke(
        &self,
        ctx: &SkillContext,
        request: MetaToolRequest,
    ) -> SkillResult<MetaToolResponse> {
        if request.list_skills {
            return Ok(MetaToolResponse::Catalog {
                skills: self.manager.list_summaries().await,
            });
        }

        let skill_id = request
            .skill_name
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| {
                SkillError::InvalidInput("either list_skills or skill_name is required".into())
            })?;
        let skill = self
            .manager
            .get(&skill_id)
            .await
            .ok_or_else(|| SkillError::NotFound(skill_id.clone()))?;

        if !self.manager.is_loaded(&skill_id).await {
            match self.manager.load(ctx, &skill_id, &self.load_config).await {
                // Lost a race with a concurrent activation.
                Ok(()) | Err(SkillError::AlreadyLoaded(_)) => {}
                Err(e) => return Err(e),
            }
        }

        let instructions = self.instructions_of(skill.as_ref(), ctx).await?;
        let action = request
            .action
            .filter(|a| !a.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ACTION.to_string());
        debug!("Meta-tool dispatching {} to skill {}", action, skill_id);

        match skill.as_action_executor() {
            Some(executor) => {
                let result = executor
                    .execute_action(ctx, &action, request.params)
                    .await?;
                Ok(MetaToolResponse::Executed {
                    skill_id,
                    action,
                    result,
                    instructions,
                })
            }
            None => Ok(MetaToolResponse::Acknowledged {
                message: format!(
                    "Skill '{skill_id}' is active. Follow its instructions to carry out '{action}'."
                ),
                skill_id,
                action,
                params: request.params,
                instructions,
            }),
        }
    }

    async fn instructions_of(
        &self,
        skill: &dyn Skill,
        ctx: &SkillContext,
    ) -> SkillResult<Option<SkillInstructions>> {
        if let Some(progressive) = skill.as_progressive() {
            return match progressive.load_instructions(ctx).await {
                Ok(instructions) => Ok(Some(instructions.as_ref().clone())),
                // Progressive skills may ship without Level 2.
                Err(SkillError::InvalidConfig(_)) => Ok(None),
                Err(e) => Err(e),
            };
        }

        let system_prompt = skill.system_prompt().await;
        let examples = skill.examples().await;
        if system_prompt.is_empty() && examples.is_empty() {
            return Ok(None);
        }
        Ok(Some(SkillInstructions {
            system_prompt,
            examples,
            ..Default::default()
        }))
    }
}

#[async_trait]
impl Tool for SkillMetaTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "list_skills": {
                    "type": "boolean",
                    "description": "List every available skill with its description"
                },
                "skill_name": {
                    "type": "string",
                    "description": "Id of the skill to use"
                },
                "action": {
                    "type": "string",
                    "description": "Action to perform with the skill (defaults to \"use\")"
                },
                "params": {
                    "type": "object",
                    "description": "Action parameters"
                }
            }
        })
    }

    async fn execute(&self, input: ToolInput, ctx: &SkillContext) -> ToolResult {
        let request: MetaToolRequest = match serde_json::from_value(input.arguments) {
            Ok(request) => request,
            Err(e) => return ToolResult::failure(format!("Invalid arguments: {e}")),
        };

        match self.invoke(ctx, request).await {
            Ok(response) => match serde_json::to_value(&response) {
                Ok(output) => {
                    let result = ToolResult::success(output);
                    match response.skill_id() {
                        Some(skill_id) => result.with_metadata("skill_id", skill_id),
                        None => result,
                    }
                }
                Err(e) => ToolResult::failure(e.to_string()),
            },
            Err(e) => ToolResult::failure(e.to_string()),
        }
    }
}
