//! Target graph, execution engine, and artifact contracts.

pub mod artifacts;
pub mod executor;
pub mod graph;
pub mod report;

pub use executor::{AbortHandle, Engine, RunOptions, RunProgress, SkipMode};
pub use graph::{TargetGraph, TargetGraphBuilder};
pub use report::{ExecutionReport, FailureKind, TargetOutcome, TargetState};
