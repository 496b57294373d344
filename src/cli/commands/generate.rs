//! Generate command implementation.
//!
//! `cairn generate` renders the declared workflow into
//! `.github/workflows/<name>.yml`. With `--check` it verifies the on-disk
//! file is byte-identical to a fresh generation, which keeps committed
//! workflows reviewable as ordinary diffs.

use std::fs;
use std::path::{Path, PathBuf};

use crate::ci::{render, Generator};
use crate::cli::args::GenerateArgs;
use crate::config::load_config;
use crate::error::{CairnError, Result};
use crate::pipeline::build_targets;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The generate command implementation.
pub struct GenerateCommand {
    project_root: PathBuf,
    config_path: Option<PathBuf>,
    args: GenerateArgs,
}

impl GenerateCommand {
    /// Create a new generate command.
    pub fn new(project_root: &Path, config_path: Option<&Path>, args: GenerateArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            config_path: config_path.map(|p| p.to_path_buf()),
            args,
        }
    }
}

impl Command for GenerateCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let config = match load_config(&self.project_root, self.config_path.as_deref()) {
            Ok(c) => c,
            Err(CairnError::ConfigNotFound { path }) => {
                ui.error(&format!("No pipeline file found at {}", path.display()));
                return Ok(CommandResult::failure(2));
            }
            Err(e) => return Err(e),
        };

        let spec = match &config.workflow {
            Some(spec) => spec,
            None => {
                ui.error("pipeline declares no workflow section");
                return Ok(CommandResult::failure(2));
            }
        };

        let targets = build_targets(&config);
        let generator = Generator::new(&targets)?;
        let hooks = Generator::default_hooks(spec);
        let job = generator.generate(spec, &hooks)?;
        let rendered = render(&job);

        let output_path = match &self.args.output {
            Some(path) => path.clone(),
            None => self
                .project_root
                .join(".github")
                .join("workflows")
                .join(format!("{}.yml", spec.name)),
        };

        if self.args.check {
            let existing = fs::read_to_string(&output_path).unwrap_or_default();
            if existing == rendered {
                ui.success(&format!("{} is up to date", output_path.display()));
                return Ok(CommandResult::success());
            }
            ui.error(&format!(
                "{} is out of date; run 'cairn generate'",
                output_path.display()
            ));
            return Ok(CommandResult::failure(1));
        }

        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&output_path, &rendered)?;

        ui.success(&format!("wrote {}", output_path.display()));
        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUi;
    use tempfile::TempDir;

    const PIPELINE: &str = r#"
        targets:
          - name: restore
            run: cargo fetch
          - name: compile
            run: cargo build
            depends_on: [restore]
          - name: ci
            depends_on: [compile]
        workflow:
          name: continuous-delivery
          on_push_branches: ["master"]
          invoked_targets: [ci]
          toolchain: "1.93"
    "#;

    fn generate(dir: &TempDir, args: GenerateArgs) -> (CommandResult, MockUi) {
        std::fs::write(dir.path().join("cairn.yml"), PIPELINE).unwrap();
        let mut ui = MockUi::new();
        let cmd = GenerateCommand::new(dir.path(), None, args);
        let result = cmd.execute(&mut ui).unwrap();
        (result, ui)
    }

    #[test]
    fn writes_workflow_to_default_path() {
        let temp = TempDir::new().unwrap();
        let (result, _) = generate(&temp, GenerateArgs::default());

        assert!(result.success);
        let path = temp
            .path()
            .join(".github/workflows/continuous-delivery.yml");
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("cairn run compile --skip"));
        assert!(content.contains("Setup toolchain"));
    }

    #[test]
    fn check_passes_when_file_is_current() {
        let temp = TempDir::new().unwrap();
        generate(&temp, GenerateArgs::default());

        let (result, _) = generate(
            &temp,
            GenerateArgs {
                check: true,
                ..Default::default()
            },
        );
        assert!(result.success);
    }

    #[test]
    fn check_fails_on_drift() {
        let temp = TempDir::new().unwrap();
        generate(&temp, GenerateArgs::default());

        let path = temp
            .path()
            .join(".github/workflows/continuous-delivery.yml");
        std::fs::write(&path, "tampered\n").unwrap();

        let (result, ui) = generate(
            &temp,
            GenerateArgs {
                check: true,
                ..Default::default()
            },
        );
        assert_eq!(result.exit_code, 1);
        assert!(ui.errors()[0].contains("out of date"));
    }

    #[test]
    fn missing_workflow_section_exits_2() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("cairn.yml"), "targets:\n  - name: x\n").unwrap();

        let mut ui = MockUi::new();
        let cmd = GenerateCommand::new(temp.path(), None, GenerateArgs::default());
        let result = cmd.execute(&mut ui).unwrap();

        assert_eq!(result.exit_code, 2);
        assert!(ui.errors()[0].contains("no workflow section"));
    }

    #[test]
    fn explicit_output_path_wins() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("ci.yml");
        let (result, _) = generate(
            &temp,
            GenerateArgs {
                output: Some(out.clone()),
                ..Default::default()
            },
        );

        assert!(result.success);
        assert!(out.exists());
    }
}
