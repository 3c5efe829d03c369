//! SkillKit Testing Framework
//!
//! Test doubles for skills, loaders and tools so registry and meta-tool behavior can be
//! exercised without real skill directories.

pub mod hooks;
pub mod loaders;
pub mod tools;

pub use hooks::{LoadLog, RecordingHook};
pub use loaders::CountingLoader;
pub use tools::MockTool;
