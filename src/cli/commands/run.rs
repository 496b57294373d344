//! Run command implementation.
//!
//! `cairn run <target>...` resolves parameters, builds the target graph,
//! executes the reachable sub-graph, and prints a summary of every
//! visited target with its terminal state.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cli::args::RunArgs;
use crate::config::load_config;
use crate::error::{CairnError, Result};
use crate::params::{parse_override, ParameterResolver, Redactor};
use crate::pipeline::{build_targets, RunContext};
use crate::runner::{
    AbortHandle, Engine, ExecutionReport, RunOptions, RunProgress, SkipMode, TargetState,
};
use crate::ui::{should_use_colors, CairnTheme, SpinnerHandle, UserInterface};

use super::dispatcher::{Command, CommandResult};

/// The run command implementation.
pub struct RunCommand {
    project_root: PathBuf,
    config_path: Option<PathBuf>,
    args: RunArgs,
}

impl RunCommand {
    /// Create a new run command.
    pub fn new(project_root: &Path, config_path: Option<&Path>, args: RunArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            config_path: config_path.map(|p| p.to_path_buf()),
            args,
        }
    }
}

impl Command for RunCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let config = match load_config(&self.project_root, self.config_path.as_deref()) {
            Ok(c) => c,
            Err(CairnError::ConfigNotFound { path }) => {
                ui.error(&format!("No pipeline file found at {}", path.display()));
                return Ok(CommandResult::failure(2));
            }
            Err(e) => return Err(e),
        };

        let targets = build_targets(&config);

        let mut overrides = Vec::new();
        for raw in &self.args.params {
            overrides.push(parse_override(raw)?);
        }

        let mut redactor = Redactor::new();
        let params = ParameterResolver::new(&config.parameters)
            .with_overrides(overrides)
            .resolve(ui, &mut redactor)?;

        let ctx = RunContext::detect(&self.project_root, self.args.branch.clone(), params);
        let engine = Engine::new(&targets)?;

        let options = RunOptions {
            skip: SkipMode::from_args(self.args.skip.clone()),
            dry_run: self.args.dry_run,
            parallel: self.args.parallel,
            max_parallel: self.args.max_parallel,
            redactor,
            abort: AbortHandle::new(),
        };

        let theme = if should_use_colors() {
            CairnTheme::new()
        } else {
            CairnTheme::plain()
        };

        // Spinners only make sense when one target runs at a time.
        let use_spinner = !self.args.parallel && ui.is_interactive();
        let mut spinner: Option<Box<dyn SpinnerHandle>> = None;

        let report = engine.run_with_progress(
            &self.args.targets,
            &ctx,
            &options,
            |progress| match progress {
                RunProgress::TargetStarting {
                    name,
                    position,
                    total,
                } => {
                    let label = format!("[{}/{}] {}", position + 1, total, name);
                    if use_spinner {
                        spinner = Some(ui.start_spinner(&label));
                    } else {
                        ui.message(&format!("  {}", theme.target.apply_to(&label)));
                    }
                }
                RunProgress::TargetFinished { outcome } => {
                    let label = match outcome.duration {
                        Some(d) => format!("{} ({})", outcome.name, format_duration(d)),
                        None => outcome.name.clone(),
                    };
                    if let Some(mut handle) = spinner.take() {
                        match outcome.state {
                            TargetState::Succeeded => handle.finish_success(&label),
                            TargetState::Failed => handle.finish_error(&label),
                            _ => handle.finish_skipped(&label),
                        }
                    } else if outcome.state == TargetState::Failed {
                        ui.error(&label);
                    }
                }
                RunProgress::TargetGated { name, state } => {
                    let line = match state {
                        TargetState::Blocked => {
                            theme.format_blocked(&format!("{} blocked (dependency failed)", name))
                        }
                        TargetState::Cancelled => {
                            theme.format_skipped(&format!("{} cancelled", name))
                        }
                        _ => theme.format_skipped(&format!("{} skipped", name)),
                    };
                    ui.message(&format!("  {line}"));
                }
            },
        )?;

        print_summary(ui, &theme, &report);

        if self.args.json {
            let json = serde_json::to_string_pretty(&report)
                .map_err(|e| CairnError::Other(e.into()))?;
            println!("{json}");
        }

        if report.success {
            ui.success(&format!(
                "{} succeeded in {}",
                self.args.targets.join(", "),
                format_duration(report.duration())
            ));
            Ok(CommandResult::success())
        } else {
            match report.first_failure() {
                Some(failure) => {
                    let kind = failure
                        .kind
                        .map(|k| k.label())
                        .unwrap_or("execution failure");
                    ui.error(&format!("target '{}' failed: {}", failure.name, kind));
                }
                None => ui.error("run did not complete"),
            }
            Ok(CommandResult::failure(1))
        }
    }
}

/// Print the per-target summary.
fn print_summary(ui: &mut dyn UserInterface, theme: &CairnTheme, report: &ExecutionReport) {
    ui.message("");
    ui.message(&format!("{}", theme.key.apply_to("Run summary:")));

    for outcome in &report.outcomes {
        let duration = outcome
            .duration
            .map(|d| format!(" ({})", format_duration(d)))
            .unwrap_or_default();
        let line = match outcome.state {
            TargetState::Succeeded => {
                theme.format_success(&format!("{}{}", outcome.name, duration))
            }
            TargetState::Failed => {
                let kind = outcome
                    .kind
                    .map(|k| k.label())
                    .unwrap_or("execution failure");
                theme.format_error(&format!("{}{} — {}", outcome.name, duration, kind))
            }
            TargetState::Blocked => theme.format_blocked(&format!("{} blocked", outcome.name)),
            TargetState::Cancelled => theme.format_skipped(&format!("{} cancelled", outcome.name)),
            _ => theme.format_skipped(&format!("{} skipped", outcome.name)),
        };
        ui.message(&format!("  {line}"));

        if let Some(error) = &outcome.error {
            for detail in error.lines() {
                ui.message(&format!("      {}", theme.dim.apply_to(detail)));
            }
        }
    }
}

/// Compact duration formatting: `420ms`, `3.4s`, `2m 05s`.
fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs_f64();
    if secs < 1.0 {
        format!("{}ms", duration.as_millis())
    } else if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        let minutes = (secs / 60.0).floor() as u64;
        let rest = secs - (minutes as f64) * 60.0;
        format!("{}m {:02.0}s", minutes, rest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUi;
    use std::fs;
    use tempfile::TempDir;

    fn write_pipeline(dir: &TempDir, content: &str) {
        fs::write(dir.path().join("cairn.yml"), content).unwrap();
    }

    fn run(dir: &TempDir, args: RunArgs) -> (CommandResult, MockUi) {
        let mut ui = MockUi::new();
        let cmd = RunCommand::new(dir.path(), None, args);
        let result = cmd.execute(&mut ui).unwrap();
        (result, ui)
    }

    #[test]
    fn missing_pipeline_file_exits_2() {
        let temp = TempDir::new().unwrap();
        let (result, ui) = run(
            &temp,
            RunArgs {
                targets: vec!["compile".into()],
                ..Default::default()
            },
        );

        assert_eq!(result.exit_code, 2);
        assert!(ui.errors()[0].contains("No pipeline file"));
    }

    #[cfg(unix)]
    #[test]
    fn successful_pipeline_exits_0() {
        let temp = TempDir::new().unwrap();
        write_pipeline(
            &temp,
            r#"
            targets:
              - name: restore
                run: "true"
              - name: compile
                run: "true"
                depends_on: [restore]
        "#,
        );

        let (result, ui) = run(
            &temp,
            RunArgs {
                targets: vec!["compile".into()],
                ..Default::default()
            },
        );

        assert_eq!(result.exit_code, 0);
        let summary = ui.messages().join("\n");
        assert!(summary.contains("restore"));
        assert!(summary.contains("compile"));
    }

    #[cfg(unix)]
    #[test]
    fn failing_target_exits_1_and_names_it() {
        let temp = TempDir::new().unwrap();
        write_pipeline(
            &temp,
            r#"
            targets:
              - name: broken
                run: "exit 1"
        "#,
        );

        let (result, ui) = run(
            &temp,
            RunArgs {
                targets: vec!["broken".into()],
                ..Default::default()
            },
        );

        assert_eq!(result.exit_code, 1);
        let errors = ui.errors().join("\n");
        assert!(errors.contains("broken"));
        assert!(errors.contains("execution failure"));
    }

    #[test]
    fn unknown_target_is_an_error() {
        let temp = TempDir::new().unwrap();
        write_pipeline(&temp, "targets:\n  - name: compile\n");

        let mut ui = MockUi::new();
        let cmd = RunCommand::new(
            temp.path(),
            None,
            RunArgs {
                targets: vec!["deploy".into()],
                ..Default::default()
            },
        );
        let result = cmd.execute(&mut ui);
        assert!(matches!(result, Err(CairnError::UnknownTarget { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn dry_run_reports_success_without_running() {
        let temp = TempDir::new().unwrap();
        let marker = temp.path().join("ran.txt");
        write_pipeline(
            &temp,
            &format!(
                "targets:\n  - name: touchy\n    run: \"touch {}\"\n",
                marker.display()
            ),
        );

        let (result, _) = run(
            &temp,
            RunArgs {
                targets: vec!["touchy".into()],
                dry_run: true,
                ..Default::default()
            },
        );

        assert_eq!(result.exit_code, 0);
        assert!(!marker.exists());
    }

    #[test]
    fn format_duration_scales() {
        assert_eq!(format_duration(Duration::from_millis(420)), "420ms");
        assert_eq!(format_duration(Duration::from_millis(3400)), "3.4s");
        assert_eq!(format_duration(Duration::from_secs(125)), "2m 05s");
    }
}
