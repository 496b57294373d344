//! Cairn - declarative build-pipeline orchestrator.
//!
//! Cairn models a build as a set of named, interdependent targets declared
//! in `cairn.yml`. The same target graph drives two things: local execution
//! in dependency order, and generation of a GitHub Actions workflow whose
//! steps mirror that order exactly.
//!
//! # Modules
//!
//! - [`ci`] - Workflow generation, step hooks, and the deterministic writer
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Pipeline file loading, parsing, and validation
//! - [`error`] - Error types and result aliases
//! - [`params`] - Parameter resolution, secrets, and redaction
//! - [`pipeline`] - Target declarations, conditions, and the run context
//! - [`runner`] - Target graph, execution engine, and artifact contracts
//! - [`shell`] - Shell command execution
//! - [`ui`] - Interactive prompts, spinners, and terminal output
//!
//! # Example
//!
//! ```
//! use cairn::runner::TargetGraph;
//!
//! let graph = TargetGraph::builder()
//!     .target("restore")
//!     .target("compile")
//!     .depends_on("compile", "restore")
//!     .build()
//!     .unwrap();
//!
//! let order = graph.topological_order(&graph.all_targets()).unwrap();
//! assert_eq!(graph.name_of(order[0]), "restore");
//! ```

pub mod ci;
pub mod cli;
pub mod config;
pub mod error;
pub mod params;
pub mod pipeline;
pub mod runner;
pub mod shell;
pub mod ui;

pub use error::{CairnError, Result};
