//! Shared state for CLI commands

use crate::error::CliError;
use skillkit_foundation::ManagerConfig;
use skillkit_foundation::bootstrap::{load_manager_config, manager_with_discovery};
use skillkit_foundation::skill::SkillManager;
use skillkit_kernel::SkillContext;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Manager plus the execution context every command runs under
pub struct CliContext {
    pub manager: Arc<SkillManager>,
    pub skill_ctx: SkillContext,
}

impl CliContext {
    /// Build the manager from an optional config file and extra skill directories.
    ///
    /// Directories passed on the command line are scanned after the configured ones, so a
    /// configured skill wins over a command-line skill with the same id.
    pub async fn initialize(config: Option<&Path>, extra_dirs: &[PathBuf]) -> Result<Self, CliError> {
        let mut manager_config = match config {
            Some(path) => load_manager_config(path)
                .map_err(|report| CliError::ConfigError(format!("{report:?}")))?,
            None => ManagerConfig::default(),
        };
        manager_config.skills_dirs.extend(extra_dirs.iter().cloned());
        if manager_config.skills_dirs.is_empty() {
            manager_config.skills_dirs.push(PathBuf::from("skills"));
        }
        debug!(dirs = ?manager_config.skills_dirs, "Scanning skill directories");

        let manager = manager_with_discovery(manager_config)
            .await
            .map_err(|report| CliError::ConfigError(format!("{report:?}")))?;

        Ok(Self {
            manager,
            skill_ctx: SkillContext::new("skillkit-cli"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_skill(root: &Path, id: &str, frontmatter: &str) {
        let dir = root.join(id);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("SKILL.md"),
            format!("---\n{frontmatter}\n---\nInstructions for {id}.\n"),
        )
        .unwrap();
    }

    #[tokio::test]
    async fn test_initialize_from_command_line_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        write_skill(tmp.path(), "pdf", "name: pdf\ndescription: PDF tools");

        let ctx = CliContext::initialize(None, &[tmp.path().to_path_buf()])
            .await
            .unwrap();
        assert_eq!(ctx.manager.count().await, 1);
        assert!(ctx.manager.get("pdf").await.is_some());
    }

    #[tokio::test]
    async fn test_missing_config_file_is_a_config_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("nope.toml");

        let result = CliContext::initialize(Some(&missing), &[]).await;
        assert!(matches!(result, Err(CliError::ConfigError(_))));
    }
}
