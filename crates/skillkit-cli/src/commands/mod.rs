//! Command implementations

pub mod list;
pub mod plan;
pub mod show;
