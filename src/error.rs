//! Error types for cairn operations.
//!
//! This module defines [`CairnError`], the primary error type used throughout
//! the application, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Use `CairnError` for domain-specific errors that need distinct handling
//! - Use `anyhow::Error` (via `CairnError::Other`) for unexpected errors
//! - All errors should provide actionable messages for users
//! - Secret values are redacted before they can reach any error message

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for cairn operations.
#[derive(Debug, Error)]
pub enum CairnError {
    /// Pipeline file not found at expected location.
    #[error("Pipeline file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse the pipeline file.
    #[error("Failed to parse pipeline file at {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    /// Invalid declarations or unresolved required parameters.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Target dependency cycle detected at graph-build time.
    #[error("Dependency cycle detected: {cycle}")]
    DependencyCycle { cycle: String },

    /// A requested or referenced target is not declared.
    #[error("Unknown target: {name}")]
    UnknownTarget { name: String },

    /// A target's action reported failure.
    #[error("Target '{target}' failed: {message}")]
    TargetFailed { target: String, message: String },

    /// A target's action succeeded but a declared output pattern matched no files.
    #[error("Target '{target}' produced no artifacts matching '{pattern}'")]
    ArtifactContract { target: String, pattern: String },

    /// Shell command failed to spawn or was killed.
    #[error("Command failed with exit code {code:?}: {command}")]
    CommandFailed { command: String, code: Option<i32> },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for cairn operations.
pub type Result<T> = std::result::Result<T, CairnError>;
