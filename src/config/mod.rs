//! Pipeline file loading, parsing, and validation.

pub mod loader;
pub mod schema;

pub use loader::{find_pipeline_file, load_config, validate_config};
pub use schema::{
    Condition, ParameterConfig, ParameterKind, PipelineConfig, TargetConfig, WorkflowConfig,
};
