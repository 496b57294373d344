//! Workflow generation for CI providers.
//!
//! The generator projects a target sub-graph plus workflow metadata into
//! an ordered job description; hooks let a pipeline splice in provider
//! bootstrap steps at fixed positions; the writer renders the result
//! byte-for-byte deterministically.

pub mod customize;
pub mod generator;
pub mod job;
pub mod writer;

pub use customize::{insert_at, setup_toolchain, StepHook, StepHooks};
pub use generator::Generator;
pub use job::{Step, WorkflowJob};
pub use writer::render;
