//! Pipeline file schema definitions.
//!
//! This module contains the struct definitions that map to the `cairn.yml`
//! pipeline declaration file. Targets and parameters are sequences rather
//! than mappings: declaration order is meaningful (it breaks scheduling
//! ties deterministically), and a YAML mapping would not preserve it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::HashMap;

/// Root structure for `cairn.yml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Pipeline name (for display purposes).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Parameter declarations.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterConfig>,

    /// Target declarations, in registration order.
    pub targets: Vec<TargetConfig>,

    /// Workflow generation metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow: Option<WorkflowConfig>,
}

/// A single target declaration record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TargetConfig {
    /// Unique target name (compared case-insensitively).
    pub name: String,

    /// Description shown in listings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Shell command to execute. A target without a command is an
    /// aggregation point and succeeds once its dependencies have.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run: Option<String>,

    /// Result-propagating dependencies.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,

    /// Ordering-only constraint: this target runs before the named ones.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub before: Vec<String>,

    /// Ordering-only constraint: this target runs after the named ones.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub after: Vec<String>,

    /// Conditions that must all hold for the target to run.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub only_when: Vec<Condition>,

    /// Output glob patterns the action promises to produce.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub produces: Vec<String>,

    /// Targets whose produced artifacts this target reads.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub consumes: Vec<String>,

    /// Hidden from listings but still invokable and reachable.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub unlisted: bool,

    /// Parameter names that must be bound before this target runs.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<String>,

    /// Extra environment variables for the action.
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub env: HashMap<String, String>,
}

/// A declarative run condition, evaluated against the run context.
///
/// Multiple conditions on one target are ANDed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    /// Current branch matches any of the glob patterns.
    Branch(Vec<String>),

    /// Environment variable is present and non-empty.
    EnvSet(String),

    /// A resolved parameter equals the given value (case-insensitive).
    ParamEquals { name: String, value: String },

    /// Running on a CI server.
    Ci,
}

/// Declared value kind of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterKind {
    #[default]
    String,
    Bool,
    Path,
}

/// A parameter declaration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParameterConfig {
    /// Parameter name (compared case-insensitively).
    pub name: String,

    /// Description shown when prompting.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Declared value kind.
    #[serde(skip_serializing_if = "is_default_kind")]
    pub kind: ParameterKind,

    /// Must resolve to a non-empty value before any target runs.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,

    /// Value is wrapped in a redacting type and never echoed.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub secret: bool,

    /// Default value when no other source binds the parameter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,

    /// Environment variable to read, overriding the derived name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env: Option<String>,
}

/// Workflow generation metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkflowConfig {
    /// Workflow and job name.
    pub name: String,

    /// Runner image.
    pub runs_on: String,

    /// Branch globs that trigger the workflow on push.
    pub on_push_branches: Vec<String>,

    /// Entry targets the generated workflow executes.
    pub invoked_targets: Vec<String>,

    /// Checkout fetch depth (0 = full history).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetch_depth: Option<u32>,

    /// Upload declared artifacts from the generated workflow.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub publish_artifacts: bool,

    /// Import the provider token into the job environment.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub enable_github_token: bool,

    /// Secret names imported into the job environment. Names only;
    /// values stay on the provider side.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub import_secrets: Vec<String>,

    /// Permission scopes, e.g. `contents: write`.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub permissions: BTreeMap<String, String>,

    /// Toolchain version for the bootstrap step hook.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub toolchain: Option<String>,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            runs_on: default_runs_on(),
            on_push_branches: Vec::new(),
            invoked_targets: Vec::new(),
            fetch_depth: None,
            publish_artifacts: false,
            enable_github_token: false,
            import_secrets: Vec::new(),
            permissions: BTreeMap::new(),
            toolchain: None,
        }
    }
}

fn default_runs_on() -> String {
    "ubuntu-latest".to_string()
}

fn is_default_kind(kind: &ParameterKind) -> bool {
    *kind == ParameterKind::String
}
