//! Generated workflow model.
//!
//! Plain data produced fresh on every generation request and never
//! mutated after rendering. Mappings are `BTreeMap` so iteration order is
//! a property of the data, not of hash seeds.

use std::collections::BTreeMap;

use serde::Serialize;

/// One step of a generated job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Step {
    /// Display name.
    pub name: String,

    /// Provider action reference, for `uses` steps.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uses: Option<String>,

    /// Command line, for `run` steps.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run: Option<String>,

    /// Arguments for a `uses` step.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub with: BTreeMap<String, String>,

    /// Step-level environment.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
}

impl Step {
    /// A step referencing a provider action.
    pub fn uses(name: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uses: Some(action.into()),
            run: None,
            with: BTreeMap::new(),
            env: BTreeMap::new(),
        }
    }

    /// A step running a command.
    pub fn run(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uses: None,
            run: Some(command.into()),
            with: BTreeMap::new(),
            env: BTreeMap::new(),
        }
    }

    /// Add a `with` argument.
    pub fn with_arg(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.with.insert(key.into(), value.into());
        self
    }

    /// Add a step-level environment variable.
    pub fn env_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }
}

/// A generated workflow: one job plus its triggers and permissions.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowJob {
    /// Workflow and job name.
    pub name: String,

    /// Runner image.
    pub runs_on: String,

    /// Push branch globs that trigger the workflow.
    pub on_push_branches: Vec<String>,

    /// Permission scopes.
    pub permissions: BTreeMap<String, String>,

    /// Job-level environment. Imported secrets appear here by name,
    /// referencing the provider's secret store; values never land in the
    /// generated file.
    pub env: BTreeMap<String, String>,

    /// Ordered steps.
    pub steps: Vec<Step>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uses_step_has_no_run() {
        let step = Step::uses("Checkout", "actions/checkout@v4");
        assert_eq!(step.uses.as_deref(), Some("actions/checkout@v4"));
        assert!(step.run.is_none());
    }

    #[test]
    fn run_step_has_no_uses() {
        let step = Step::run("Compile", "cairn run compile --skip");
        assert_eq!(step.run.as_deref(), Some("cairn run compile --skip"));
        assert!(step.uses.is_none());
    }

    #[test]
    fn with_args_are_sorted_by_key() {
        let step = Step::uses("Setup", "some/action@v1")
            .with_arg("zeta", "1")
            .with_arg("alpha", "2");

        let keys: Vec<_> = step.with.keys().collect();
        assert_eq!(keys, vec!["alpha", "zeta"]);
    }
}
