//! Per-run execution context.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::params::ResolvedParameters;
use crate::shell;

/// Immutable facts about the current run, shared by condition evaluation
/// and actions. Built once per invocation.
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Project root all actions run beneath.
    pub project_root: PathBuf,

    /// Current version-control branch, when known.
    pub branch: Option<String>,

    /// Snapshot of the process environment.
    pub env: HashMap<String, String>,

    /// Whether this run happens on a CI server.
    pub is_ci: bool,

    /// Parameters resolved for this run.
    pub params: ResolvedParameters,
}

impl RunContext {
    /// Create a context with an empty environment (tests and library use).
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            branch: None,
            env: HashMap::new(),
            is_ci: false,
            params: ResolvedParameters::new(),
        }
    }

    /// Detect the context from the process environment.
    ///
    /// Branch resolution order: explicit override, `GITHUB_REF_NAME`
    /// (set by the CI runner), then `git rev-parse` in the project root.
    pub fn detect(
        project_root: &Path,
        branch_override: Option<String>,
        params: ResolvedParameters,
    ) -> Self {
        let env: HashMap<String, String> = std::env::vars().collect();
        let branch = branch_override
            .or_else(|| env.get("GITHUB_REF_NAME").filter(|v| !v.is_empty()).cloned())
            .or_else(|| current_git_branch(project_root));

        Self {
            project_root: project_root.to_path_buf(),
            branch,
            env,
            is_ci: shell::is_ci(),
            params,
        }
    }
}

/// Ask git for the checked-out branch name.
fn current_git_branch(project_root: &Path) -> Option<String> {
    let options = shell::CommandOptions {
        cwd: Some(project_root.to_path_buf()),
        capture: true,
        ..Default::default()
    };
    let result = shell::execute("git rev-parse --abbrev-ref HEAD", &options).ok()?;
    if !result.success {
        return None;
    }
    let branch = result.stdout.trim();
    if branch.is_empty() || branch == "HEAD" {
        None
    } else {
        Some(branch.to_string())
    }
}
