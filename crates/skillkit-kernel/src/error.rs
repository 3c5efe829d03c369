//! Error types for the skill runtime.
//!
//! [`SkillError`] is the taxonomy every registry, entity and meta-tool operation returns.
//! Hook, loader and action failures supplied by the embedding application arrive as
//! [`BoxError`] and are wrapped with the skill id and the attempted operation.
//!
//! [`KernelError`] composes the sub-system errors for the bootstrap path, where
//! [`error_stack::Report`] carries human-readable context.
//!
//! # Usage
//!
//! ```rust,ignore
//! use skillkit_kernel::error::{KernelError, KernelResult};
//! use error_stack::{Report, ResultExt};
//!
//! fn read_manifest(path: &str) -> KernelResult<String> {
//!     std::fs::read_to_string(path)
//!         .map_err(KernelError::from)
//!         .map_err(Report::new)
//!         .attach(format!("reading {path}"))
//! }
//! ```

use crate::config::ConfigError;
use crate::skill::LoadLevel;
use thiserror::Error;

/// Boxed error produced by application-supplied hooks, loaders and action handlers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Skill operation result type.
pub type SkillResult<T> = Result<T, SkillError>;

/// Errors surfaced by skill registry and entity operations.
///
/// Every variant is an expected, recoverable condition; none of them is raised by panicking.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SkillError {
    /// Unknown skill id.
    #[error("Skill not found: {0}")]
    NotFound(String),

    /// A skill with the same id is already registered.
    #[error("Skill already registered: {0}")]
    AlreadyRegistered(String),

    /// The skill is already activated.
    #[error("Skill already loaded: {0}")]
    AlreadyLoaded(String),

    /// The skill is not activated.
    #[error("Skill not loaded: {0}")]
    NotLoaded(String),

    /// The dependency graph reachable from a skill contains a cycle.
    ///
    /// `path` lists the chain that closes the cycle, first and last entries being equal.
    #[error("Circular dependency detected: {}", path.join(" -> "))]
    CircularDependency { path: Vec<String> },

    /// A declared dependency is not registered.
    #[error("Dependency not met: {skill_id} requires {dependency}")]
    DependencyNotMet { skill_id: String, dependency: String },

    /// The dependency chain is deeper than the configured limit.
    #[error("Dependency chain of {skill_id} exceeds max depth {max_depth}")]
    DependencyDepthExceeded { skill_id: String, max_depth: usize },

    /// Invalid skill or runtime configuration (empty id, missing loader, ...).
    #[error("Invalid skill configuration: {0}")]
    InvalidConfig(String),

    /// The skill's load hook failed.
    #[error("Skill {skill_id} load failed: {source}")]
    LoadFailed {
        skill_id: String,
        #[source]
        source: BoxError,
    },

    /// The skill's unload hook failed.
    #[error("Skill {skill_id} unload failed: {source}")]
    UnloadFailed {
        skill_id: String,
        #[source]
        source: BoxError,
    },

    /// A Level-2 or Level-3 loader collaborator failed.
    #[error("Skill {skill_id} failed to load {level} payload: {source}")]
    LoaderFailed {
        skill_id: String,
        level: LoadLevel,
        #[source]
        source: BoxError,
    },

    /// The skill's action handler failed.
    #[error("Skill {skill_id} action '{action}' failed: {source}")]
    ActionFailed {
        skill_id: String,
        action: String,
        #[source]
        source: BoxError,
    },

    /// The caller cancelled the context while a hook or loader was running.
    #[error("Skill {skill_id} {operation} cancelled")]
    Cancelled {
        skill_id: String,
        operation: &'static str,
    },

    /// Malformed request (meta-tool arguments and the like).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration file error.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

impl SkillError {
    /// 创建加载失败错误
    /// Create a load failure for `skill_id`.
    pub fn load_failed(skill_id: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::LoadFailed {
            skill_id: skill_id.into(),
            source: source.into(),
        }
    }

    /// 创建卸载失败错误
    /// Create an unload failure for `skill_id`.
    pub fn unload_failed(skill_id: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::UnloadFailed {
            skill_id: skill_id.into(),
            source: source.into(),
        }
    }

    /// Create a loader failure for the given level.
    pub fn loader_failed(
        skill_id: impl Into<String>,
        level: LoadLevel,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::LoaderFailed {
            skill_id: skill_id.into(),
            level,
            source: source.into(),
        }
    }

    /// Create an action failure.
    pub fn action_failed(
        skill_id: impl Into<String>,
        action: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::ActionFailed {
            skill_id: skill_id.into(),
            action: action.into(),
            source: source.into(),
        }
    }

    /// Wrap an error returned by a skill's own `load` as a [`SkillError::LoadFailed`].
    ///
    /// An error that already is a load failure for the same skill is returned unchanged.
    pub fn into_load_failure(self, skill_id: &str) -> Self {
        match self {
            Self::LoadFailed { skill_id: ref id, .. } if id == skill_id => self,
            other => Self::load_failed(skill_id, other),
        }
    }

    /// Wrap an error returned by a skill's own `unload` as a [`SkillError::UnloadFailed`].
    pub fn into_unload_failure(self, skill_id: &str) -> Self {
        match self {
            Self::UnloadFailed { skill_id: ref id, .. } if id == skill_id => self,
            other => Self::unload_failed(skill_id, other),
        }
    }

    /// Whether the error is a lookup miss.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Crate-level error type for `skillkit-kernel`.
///
/// Wraps each sub-module's typed error via `#[from]` so that the `?` operator converts them
/// automatically. Use [`error_stack::Report<KernelError>`] (via [`KernelResult`]) to attach
/// context as the error propagates.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum KernelError {
    /// An error originating from the skill sub-system.
    #[error("Skill error: {0}")]
    Skill(#[from] SkillError),

    /// A configuration-related error.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// A low-level I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON (de)serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An internal error described by a message string.
    #[error("{0}")]
    Internal(String),
}

/// Convenience result alias using [`error_stack::Report`].
pub type KernelResult<T> = Result<T, error_stack::Report<KernelError>>;
