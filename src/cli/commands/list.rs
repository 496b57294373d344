//! List command implementation.
//!
//! `cairn list` shows declared targets in declaration order. Unlisted
//! targets stay hidden unless `--all` is given; they remain invokable by
//! name either way.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::cli::args::ListArgs;
use crate::config::load_config;
use crate::error::{CairnError, Result};
use crate::ui::{should_use_colors, CairnTheme, UserInterface};

use super::dispatcher::{Command, CommandResult};

/// The list command implementation.
pub struct ListCommand {
    project_root: PathBuf,
    config_path: Option<PathBuf>,
    args: ListArgs,
}

/// One target row in `--json` output.
#[derive(Debug, Serialize)]
struct TargetRow<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    depends_on: Vec<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    produces: Vec<&'a str>,
    unlisted: bool,
}

impl ListCommand {
    /// Create a new list command.
    pub fn new(project_root: &Path, config_path: Option<&Path>, args: ListArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            config_path: config_path.map(|p| p.to_path_buf()),
            args,
        }
    }
}

impl Command for ListCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let config = match load_config(&self.project_root, self.config_path.as_deref()) {
            Ok(c) => c,
            Err(CairnError::ConfigNotFound { path }) => {
                ui.error(&format!("No pipeline file found at {}", path.display()));
                return Ok(CommandResult::failure(2));
            }
            Err(e) => return Err(e),
        };

        let visible: Vec<_> = config
            .targets
            .iter()
            .filter(|t| self.args.all || !t.unlisted)
            .collect();

        if self.args.json {
            let rows: Vec<TargetRow<'_>> = visible
                .iter()
                .map(|t| TargetRow {
                    name: &t.name,
                    description: t.description.as_deref(),
                    depends_on: t.depends_on.iter().map(String::as_str).collect(),
                    produces: t.produces.iter().map(String::as_str).collect(),
                    unlisted: t.unlisted,
                })
                .collect();
            let json = serde_json::to_string_pretty(&rows)
                .map_err(|e| CairnError::Other(e.into()))?;
            println!("{json}");
            return Ok(CommandResult::success());
        }

        let theme = if should_use_colors() {
            CairnTheme::new()
        } else {
            CairnTheme::plain()
        };

        ui.message(&format!("  {}", theme.key.apply_to("Targets:")));
        for target in &visible {
            let detail = match &target.run {
                Some(cmd) => format!(
                    " {} {}",
                    theme.dim.apply_to("—"),
                    theme.command.apply_to(cmd)
                ),
                None => String::new(),
            };
            ui.message(&format!(
                "    {}{}",
                theme.highlight.apply_to(&target.name),
                detail
            ));

            if let Some(desc) = &target.description {
                ui.message(&format!("      {}", theme.dim.apply_to(desc)));
            }

            if !target.depends_on.is_empty() {
                ui.message(&format!(
                    "      {} {}",
                    theme.dim.apply_to("└── depends on:"),
                    theme.dim.apply_to(target.depends_on.join(", "))
                ));
            }
        }

        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUi;
    use std::fs;
    use tempfile::TempDir;

    const PIPELINE: &str = r#"
        targets:
          - name: compile
            description: Build the workspace
            run: cargo build
          - name: mutation-test
            run: cargo mutants
            unlisted: true
    "#;

    fn listing(args: ListArgs) -> (CommandResult, MockUi) {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("cairn.yml"), PIPELINE).unwrap();

        let mut ui = MockUi::new();
        let cmd = ListCommand::new(temp.path(), None, args);
        let result = cmd.execute(&mut ui).unwrap();
        (result, ui)
    }

    #[test]
    fn hides_unlisted_targets_by_default() {
        let (result, ui) = listing(ListArgs::default());

        assert!(result.success);
        let output = ui.messages().join("\n");
        assert!(output.contains("compile"));
        assert!(output.contains("Build the workspace"));
        assert!(!output.contains("mutation-test"));
    }

    #[test]
    fn all_flag_includes_unlisted_targets() {
        let (_, ui) = listing(ListArgs {
            all: true,
            ..Default::default()
        });

        let output = ui.messages().join("\n");
        assert!(output.contains("mutation-test"));
    }

    #[test]
    fn missing_pipeline_exits_2() {
        let temp = TempDir::new().unwrap();
        let mut ui = MockUi::new();
        let cmd = ListCommand::new(temp.path(), None, ListArgs::default());
        let result = cmd.execute(&mut ui).unwrap();
        assert_eq!(result.exit_code, 2);
    }
}
