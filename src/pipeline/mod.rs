//! Target declarations, conditions, and the run context.

pub mod condition;
pub mod context;
pub mod target;

pub use condition::conditions_hold;
pub use context::RunContext;
pub use target::{build_targets, ResolvedTarget, ShellAction, TargetAction};
