//! 技能身份描述
//! Skill identity descriptor
//!
//! Shared by [`super::BaseSkill`] and [`super::ProgressiveSkillEntity`]: everything a skill
//! exposes at Level 1.

use skillkit_kernel::{SkillCategory, SkillError, SkillMetadata, SkillResult, SkillSummary};

/// Level-1 identity of a skill.
#[derive(Debug, Clone, Default)]
pub struct SkillDescriptor {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: SkillCategory,
    pub tags: Vec<String>,
    pub dependencies: Vec<String>,
    pub metadata: SkillMetadata,
}

impl SkillDescriptor {
    /// Create a descriptor whose display name defaults to the id.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            ..Default::default()
        }
    }

    /// Add a tag; blank and repeated tags are ignored, order is kept.
    pub fn push_tag(&mut self, tag: impl Into<String>) {
        let tag = tag.into();
        let tag = tag.trim();
        if !tag.is_empty() && !self.tags.iter().any(|t| t == tag) {
            self.tags.push(tag.to_string());
        }
    }

    /// Add a dependency id; repeated ids are ignored.
    pub fn push_dependency(&mut self, dependency: impl Into<String>) {
        let dependency = dependency.into();
        if !self.dependencies.contains(&dependency) {
            self.dependencies.push(dependency);
        }
    }

    pub(crate) fn validate(&self) -> SkillResult<()> {
        if self.id.trim().is_empty() {
            return Err(SkillError::InvalidConfig(
                "skill id must not be empty".to_string(),
            ));
        }
        if let Some(dep) = self.dependencies.iter().find(|d| d.trim().is_empty()) {
            return Err(SkillError::InvalidConfig(format!(
                "skill {} declares an empty dependency id {:?}",
                self.id, dep
            )));
        }
        Ok(())
    }

    pub fn summary(&self) -> SkillSummary {
        SkillSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            category: self.category,
            tags: self.tags.clone(),
        }
    }
}

/// Generates the identity setters shared by the skill builders.
macro_rules! descriptor_setters {
    () => {
        /// 显示名称
        /// Display name
        pub fn with_name(mut self, name: impl Into<String>) -> Self {
            self.descriptor.name = name.into();
            self
        }

        /// 描述
        /// Description shown to the LLM
        pub fn with_description(mut self, description: impl Into<String>) -> Self {
            self.descriptor.description = description.into();
            self
        }

        pub fn with_category(mut self, category: skillkit_kernel::SkillCategory) -> Self {
            self.descriptor.category = category;
            self
        }

        pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
            self.descriptor.push_tag(tag);
            self
        }

        pub fn with_tags<I, T>(mut self, tags: I) -> Self
        where
            I: IntoIterator<Item = T>,
            T: Into<String>,
        {
            for tag in tags {
                self.descriptor.push_tag(tag);
            }
            self
        }

        /// 依赖的技能
        /// Declare a dependency on another skill
        pub fn with_dependency(mut self, dependency: impl Into<String>) -> Self {
            self.descriptor.push_dependency(dependency);
            self
        }

        pub fn with_dependencies<I, T>(mut self, dependencies: I) -> Self
        where
            I: IntoIterator<Item = T>,
            T: Into<String>,
        {
            for dep in dependencies {
                self.descriptor.push_dependency(dep);
            }
            self
        }

        pub fn with_metadata(mut self, metadata: skillkit_kernel::SkillMetadata) -> Self {
            self.descriptor.metadata = metadata;
            self
        }

        /// Lifecycle hook run on load and unload.
        pub fn with_hook(
            mut self,
            hook: impl skillkit_kernel::LifecycleHook + 'static,
        ) -> Self {
            self.hook = Some(std::sync::Arc::new(hook));
            self
        }

        /// Tool contributed by the skill.
        pub fn with_tool(mut self, tool: std::sync::Arc<dyn skillkit_kernel::Tool>) -> Self {
            self.tools.push(tool);
            self
        }
    };
}

pub(crate) use descriptor_setters;
