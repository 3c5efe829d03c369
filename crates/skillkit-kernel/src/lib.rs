//! SkillKit Kernel
//!
//! 技能运行时的内核契约：技能 trait、三级渐进式数据模型、执行上下文与错误类型。
//! Kernel contracts for the skill runtime: the skill traits, the three-level progressive
//! data model, the execution context and the error taxonomy.
//!
//! Implementations (registry, entities, meta-tool) live in `skillkit-foundation`.

// context module
pub mod context;
pub use context::SkillContext;

// skill module
pub mod skill;
pub use skill::*;

// tool module
pub mod tool;
pub use tool::{LLMTool, Tool, ToolInput, ToolResult};

// error module
pub mod error;
pub use error::{BoxError, KernelError, KernelResult, SkillError, SkillResult};

// config module
pub mod config;
