//! Workflow generation from the target graph.
//!
//! Generation computes the same reachable sub-graph and topological order
//! the engine would use for the invoked targets, so what runs first
//! locally runs first in CI. Each action-bearing target maps to one run
//! step invoking `cairn run <target> --skip` (dependencies already ran in
//! earlier steps); targets with declared artifacts gain an upload step
//! when publishing is enabled.

use std::collections::BTreeMap;

use crate::ci::customize::{insert_at, setup_toolchain, StepHooks};
use crate::ci::job::{Step, WorkflowJob};
use crate::config::schema::WorkflowConfig;
use crate::error::Result;
use crate::pipeline::ResolvedTarget;
use crate::runner::TargetGraph;

/// Generates workflow jobs from a pipeline's targets.
pub struct Generator<'a> {
    targets: &'a [ResolvedTarget],
    graph: TargetGraph,
}

impl<'a> Generator<'a> {
    /// Build the generator, constructing and cycle-checking the graph.
    pub fn new(targets: &'a [ResolvedTarget]) -> Result<Self> {
        let graph = TargetGraph::from_targets(targets)?;
        Ok(Self { targets, graph })
    }

    /// The hooks a workflow declaration asks for.
    pub fn default_hooks(spec: &WorkflowConfig) -> StepHooks {
        let mut hooks = StepHooks::new();
        if let Some(version) = &spec.toolchain {
            // Index 1: immediately after checkout.
            hooks.push(insert_at(1, setup_toolchain(version)));
        }
        hooks
    }

    /// Generate the workflow job for the declared entry targets.
    pub fn generate(&self, spec: &WorkflowConfig, hooks: &StepHooks) -> Result<WorkflowJob> {
        let roots = self.graph.indices_of(&spec.invoked_targets)?;
        let subset = self.graph.reachable_from(&roots);
        let order = self.graph.topological_order(&subset)?;

        let mut checkout = Step::uses("Checkout", "actions/checkout@v4");
        if let Some(depth) = spec.fetch_depth {
            checkout = checkout.with_arg("fetch-depth", depth.to_string());
        }
        let mut steps = vec![checkout];

        for &node in &order {
            let target = &self.targets[node];
            if target.action.is_some() {
                steps.push(Step::run(
                    title_of(&target.name),
                    format!("cairn run {} --skip", target.name),
                ));
            }
            if spec.publish_artifacts && !target.produces.is_empty() {
                steps.push(
                    Step::uses(
                        format!("Upload {} artifacts", target.name),
                        "actions/upload-artifact@v4",
                    )
                    .with_arg("name", target.name.clone())
                    .with_arg("path", target.produces.join("\n")),
                );
            }
        }

        let steps = hooks.apply(steps);

        let mut env = BTreeMap::new();
        if spec.enable_github_token {
            env.insert(
                "GITHUB_TOKEN".to_string(),
                "${{ secrets.GITHUB_TOKEN }}".to_string(),
            );
        }
        for secret in &spec.import_secrets {
            env.insert(secret.clone(), format!("${{{{ secrets.{} }}}}", secret));
        }

        Ok(WorkflowJob {
            name: spec.name.clone(),
            runs_on: spec.runs_on.clone(),
            on_push_branches: spec.on_push_branches.clone(),
            permissions: spec.permissions.clone(),
            env,
            steps,
        })
    }
}

/// Display title for a target name: `unit-test` becomes `Unit test`.
fn title_of(name: &str) -> String {
    let spaced = name.replace(['-', '_'], " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => spaced,
    }
}
