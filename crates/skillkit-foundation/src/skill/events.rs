//! 技能生命周期事件
//! Skill lifecycle events

use serde::Serialize;

/// 技能事件
/// Skill event, delivered on the manager's bounded channel
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
#[non_exhaustive]
pub enum SkillEvent {
    /// 技能已注册
    /// Skill registered
    Registered { skill_id: String },
    /// 技能已注销
    /// Skill unregistered
    Unregistered { skill_id: String },
    /// 技能已加载
    /// Skill loaded
    Loaded { skill_id: String },
    /// 技能已卸载
    /// Skill unloaded
    Unloaded { skill_id: String },
    /// 技能加载失败
    /// Skill load failed
    LoadFailed { skill_id: String, error: String },
}

impl SkillEvent {
    pub fn skill_id(&self) -> &str {
        match self {
            Self::Registered { skill_id }
            | Self::Unregistered { skill_id }
            | Self::Loaded { skill_id }
            | Self::Unloaded { skill_id }
            | Self::LoadFailed { skill_id, .. } => skill_id,
        }
    }
}
