//! Resolved target declarations and their actions.
//!
//! A [`ResolvedTarget`] is one record of the pipeline's registration
//! table: everything the graph and engine need to know about a target,
//! with the unit of work behind an opaque [`TargetAction`]. The CLI backs
//! actions with shell commands; tests and library callers plug in
//! closures.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::anyhow;

use crate::config::schema::{Condition, PipelineConfig, TargetConfig};
use crate::error::{CairnError, Result};
use crate::pipeline::context::RunContext;
use crate::shell;

/// Maximum output lines carried into a failure message.
const FAILURE_OUTPUT_LINES: usize = 20;

/// An opaque unit of work. Success or failure is all the engine sees.
pub trait TargetAction: Send + Sync {
    /// Execute the work. Failure messages may contain action output; the
    /// engine redacts them before storing or printing.
    fn run(&self, ctx: &RunContext) -> Result<()>;
}

impl<F> TargetAction for F
where
    F: Fn(&RunContext) -> Result<()> + Send + Sync,
{
    fn run(&self, ctx: &RunContext) -> Result<()> {
        self(ctx)
    }
}

/// A shell-command action from a target's `run:` declaration.
pub struct ShellAction {
    command: String,
    env: HashMap<String, String>,
}

impl ShellAction {
    /// Create an action for the given command line.
    pub fn new(command: impl Into<String>, env: HashMap<String, String>) -> Self {
        Self {
            command: command.into(),
            env,
        }
    }

    /// Environment handed to the command: the declared `env:` block plus
    /// every resolved parameter as `CAIRN_PARAM_<NAME>` (secrets included;
    /// actions are the one place secrets legitimately flow).
    fn action_env(&self, ctx: &RunContext) -> HashMap<String, String> {
        let mut env = self.env.clone();
        for (name, value) in ctx.params.iter() {
            let key = format!("CAIRN_PARAM_{}", name.to_uppercase().replace(['-', '.'], "_"));
            env.insert(key, value.as_str().to_string());
        }
        env
    }
}

impl TargetAction for ShellAction {
    fn run(&self, ctx: &RunContext) -> Result<()> {
        let options = shell::CommandOptions {
            cwd: Some(ctx.project_root.clone()),
            env: self.action_env(ctx),
            capture: true,
        };

        let result = shell::execute(&self.command, &options)?;
        if result.success {
            return Ok(());
        }

        let mut lines: Vec<&str> = result
            .stdout
            .lines()
            .chain(result.stderr.lines())
            .filter(|l| !l.trim().is_empty())
            .collect();
        if lines.len() > FAILURE_OUTPUT_LINES {
            lines = lines.split_off(lines.len() - FAILURE_OUTPUT_LINES);
        }

        let code = result
            .exit_code
            .map(|c| c.to_string())
            .unwrap_or_else(|| "signal".to_string());
        if lines.is_empty() {
            Err(CairnError::Other(anyhow!("exit code {}", code)))
        } else {
            Err(CairnError::Other(anyhow!(
                "exit code {}\n{}",
                code,
                lines.join("\n")
            )))
        }
    }
}

/// A fully resolved target, ready for the graph and engine.
#[derive(Clone)]
pub struct ResolvedTarget {
    /// Target name as declared.
    pub name: String,

    /// Description shown in listings.
    pub description: Option<String>,

    /// Result-propagating dependencies.
    pub depends_on: Vec<String>,

    /// Ordering-only: this target runs before the named ones.
    pub before: Vec<String>,

    /// Ordering-only: this target runs after the named ones.
    pub after: Vec<String>,

    /// Conditions that must all hold, else the target is cleanly skipped.
    pub only_when: Vec<Condition>,

    /// The unit of work. None marks an aggregation target.
    pub action: Option<Arc<dyn TargetAction>>,

    /// Output glob patterns checked after a successful action.
    pub produces: Vec<String>,

    /// Producer targets whose artifacts this target reads.
    pub consumes: Vec<String>,

    /// Hidden from listings, still invokable.
    pub unlisted: bool,

    /// Parameters that must be bound before this target runs.
    pub requires: Vec<String>,
}

impl ResolvedTarget {
    /// Create a bare target with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            depends_on: Vec::new(),
            before: Vec::new(),
            after: Vec::new(),
            only_when: Vec::new(),
            action: None,
            produces: Vec::new(),
            consumes: Vec::new(),
            unlisted: false,
            requires: Vec::new(),
        }
    }

    /// Build from a declaration record.
    pub fn from_config(config: &TargetConfig) -> Self {
        Self {
            name: config.name.clone(),
            description: config.description.clone(),
            depends_on: config.depends_on.clone(),
            before: config.before.clone(),
            after: config.after.clone(),
            only_when: config.only_when.clone(),
            action: config.run.as_ref().map(|cmd| {
                Arc::new(ShellAction::new(cmd, config.env.clone())) as Arc<dyn TargetAction>
            }),
            produces: config.produces.clone(),
            consumes: config.consumes.clone(),
            unlisted: config.unlisted,
            requires: config.requires.clone(),
        }
    }
}

/// Build the registration table from a parsed pipeline file.
pub fn build_targets(config: &PipelineConfig) -> Vec<ResolvedTarget> {
    config.targets.iter().map(ResolvedTarget::from_config).collect()
}
