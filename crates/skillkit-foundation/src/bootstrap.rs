//! 运行时启动
//! Runtime bootstrap
//!
//! Builds a [`SkillManager`] from a configuration file and registers every skill found in the
//! configured directories.

use crate::config::ManagerConfig;
use crate::skill::{SkillDiscovery, SkillManager};
use error_stack::{Report, ResultExt};
use skillkit_kernel::config::load_config;
use skillkit_kernel::{KernelError, KernelResult};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Load a [`ManagerConfig`] from `path` (YAML, TOML, JSON or JSON5).
pub fn load_manager_config(path: impl AsRef<Path>) -> KernelResult<ManagerConfig> {
    let path = path.as_ref();
    load_config(path)
        .map_err(KernelError::from)
        .map_err(Report::new)
        .attach(format!("loading manager config from {}", path.display()))
}

/// 从配置文件创建管理器
/// Create a manager from a configuration file
pub async fn manager_from_config(path: impl AsRef<Path>) -> KernelResult<Arc<SkillManager>> {
    let config = load_manager_config(path)?;
    manager_with_discovery(config).await
}

/// 创建管理器并注册发现的技能
/// Create a manager and register the skills found in `config.skills_dirs`
///
/// Every discovered skill is registered as a progressive entity that reads Level 2 and Level 3
/// from its directory on demand.
pub async fn manager_with_discovery(config: ManagerConfig) -> KernelResult<Arc<SkillManager>> {
    let discovery = SkillDiscovery::with_search_dirs(config.skills_dirs.clone());
    let manager = Arc::new(SkillManager::with_config(config));

    let discovered = discovery.scan();
    let total = discovered.len();
    for skill in discovered {
        let skill_id = skill.descriptor.id.clone();
        let root = skill.root.clone();
        let entity = skill
            .into_entity()
            .map_err(KernelError::from)
            .map_err(Report::new)
            .attach(format!("building skill {} from {}", skill_id, root.display()))?;
        manager
            .register(entity)
            .await
            .map_err(KernelError::from)
            .map_err(Report::new)
            .attach(format!("registering skill {skill_id}"))?;
    }

    info!("Registered {} discovered skills", total);
    Ok(manager)
}
