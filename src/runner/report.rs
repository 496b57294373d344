//! Execution results and the run report.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

/// Terminal and transient states of a target during one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetState {
    /// Not yet visited.
    Pending,
    /// Action currently executing.
    Running,
    /// Action completed and artifact contract held.
    Succeeded,
    /// Action failed, a required parameter was unbound, or the artifact
    /// contract was violated.
    Failed,
    /// Condition evaluated false or the target was skipped by request.
    /// Does not propagate to dependents.
    Skipped,
    /// A depends-on or consumes predecessor failed; the target was never
    /// evaluated.
    Blocked,
    /// The run was aborted before this target started.
    Cancelled,
}

impl TargetState {
    /// Whether this state blocks dependents connected by result edges.
    pub fn blocks_dependents(&self) -> bool {
        matches!(self, Self::Failed | Self::Blocked | Self::Cancelled)
    }

    /// Short display label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
            Self::Blocked => "blocked",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Classification of a failure, for the run summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// A required parameter was unbound.
    Configuration,
    /// The action reported non-success.
    Execution,
    /// The action succeeded but a produces pattern matched nothing.
    ArtifactContract,
}

impl FailureKind {
    /// Short display label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Configuration => "configuration error",
            Self::Execution => "execution failure",
            Self::ArtifactContract => "artifact contract violation",
        }
    }
}

/// One target's result within a run.
#[derive(Debug, Clone, Serialize)]
pub struct TargetOutcome {
    /// Target name as declared.
    pub name: String,

    /// Terminal state.
    pub state: TargetState,

    /// Action duration, when the action ran.
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_duration"
    )]
    pub duration: Option<Duration>,

    /// Failure classification, when failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<FailureKind>,

    /// Redacted diagnostic, when failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TargetOutcome {
    /// An outcome with no action run.
    pub fn new(name: impl Into<String>, state: TargetState) -> Self {
        Self {
            name: name.into(),
            state,
            duration: None,
            kind: None,
            error: None,
        }
    }
}

/// The result of one engine run.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionReport {
    /// Targets the caller asked for.
    pub requested: Vec<String>,

    /// Every visited target, in execution order.
    pub outcomes: Vec<TargetOutcome>,

    /// Wall-clock start.
    pub started_at: DateTime<Utc>,

    /// Wall-clock end.
    pub finished_at: DateTime<Utc>,

    /// False when any requested target (or a dependency it needed)
    /// terminated failed, blocked, or cancelled.
    pub success: bool,
}

impl ExecutionReport {
    /// Look up a target's outcome, case-insensitively.
    pub fn outcome(&self, name: &str) -> Option<&TargetOutcome> {
        self.outcomes
            .iter()
            .find(|o| o.name.eq_ignore_ascii_case(name))
    }

    /// The first failed outcome in execution order.
    pub fn first_failure(&self) -> Option<&TargetOutcome> {
        self.outcomes
            .iter()
            .find(|o| o.state == TargetState::Failed)
    }

    /// Total run duration.
    pub fn duration(&self) -> Duration {
        (self.finished_at - self.started_at)
            .to_std()
            .unwrap_or_default()
    }
}

fn serialize_duration<S: Serializer>(
    duration: &Option<Duration>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match duration {
        Some(d) => serializer.serialize_f64(d.as_secs_f64()),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_blocked_and_cancelled_block_dependents() {
        assert!(TargetState::Failed.blocks_dependents());
        assert!(TargetState::Blocked.blocks_dependents());
        assert!(TargetState::Cancelled.blocks_dependents());
        assert!(!TargetState::Succeeded.blocks_dependents());
        assert!(!TargetState::Skipped.blocks_dependents());
    }

    #[test]
    fn outcome_lookup_is_case_insensitive() {
        let report = ExecutionReport {
            requested: vec!["Pack".into()],
            outcomes: vec![TargetOutcome::new("Pack", TargetState::Succeeded)],
            started_at: Utc::now(),
            finished_at: Utc::now(),
            success: true,
        };

        assert!(report.outcome("pack").is_some());
        assert!(report.outcome("missing").is_none());
    }

    #[test]
    fn first_failure_finds_failed_outcome() {
        let mut failed = TargetOutcome::new("compile", TargetState::Failed);
        failed.kind = Some(FailureKind::Execution);

        let report = ExecutionReport {
            requested: vec!["pack".into()],
            outcomes: vec![
                TargetOutcome::new("restore", TargetState::Succeeded),
                failed,
                TargetOutcome::new("pack", TargetState::Blocked),
            ],
            started_at: Utc::now(),
            finished_at: Utc::now(),
            success: false,
        };

        assert_eq!(report.first_failure().unwrap().name, "compile");
    }

    #[test]
    fn report_serializes_duration_as_seconds() {
        let mut outcome = TargetOutcome::new("compile", TargetState::Succeeded);
        outcome.duration = Some(Duration::from_millis(1500));

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["state"], "succeeded");
        assert!((json["duration"].as_f64().unwrap() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn failure_kind_labels() {
        assert_eq!(FailureKind::Configuration.label(), "configuration error");
        assert_eq!(
            FailureKind::ArtifactContract.label(),
            "artifact contract violation"
        );
    }
}
