//! Pipeline file discovery, loading, and validation.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::schema::PipelineConfig;
use crate::error::{CairnError, Result};

/// Default pipeline file names, checked in order.
const PIPELINE_FILE_NAMES: &[&str] = &["cairn.yml", "cairn.yaml"];

/// Find the pipeline file for the given project root.
pub fn find_pipeline_file(project_root: &Path) -> Option<PathBuf> {
    PIPELINE_FILE_NAMES
        .iter()
        .map(|name| project_root.join(name))
        .find(|path| path.exists())
}

/// Load and validate the pipeline declaration.
///
/// `config_path` overrides discovery when given (the `--config` flag).
pub fn load_config(project_root: &Path, config_path: Option<&Path>) -> Result<PipelineConfig> {
    let path = match config_path {
        Some(p) => p.to_path_buf(),
        None => {
            find_pipeline_file(project_root).ok_or_else(|| CairnError::ConfigNotFound {
                path: project_root.join(PIPELINE_FILE_NAMES[0]),
            })?
        }
    };

    if !path.exists() {
        return Err(CairnError::ConfigNotFound { path });
    }

    let content = fs::read_to_string(&path)?;
    let config: PipelineConfig =
        serde_yaml::from_str(&content).map_err(|e| CairnError::ConfigParse {
            path: path.clone(),
            message: e.to_string(),
        })?;

    validate_config(&config)?;
    Ok(config)
}

/// Validate cross-references in the declaration set.
///
/// The graph builder re-checks edge references; this pass catches the
/// declaration-level problems (duplicates, dangling parameter names,
/// consumers of artifact-less targets) with friendlier messages.
pub fn validate_config(config: &PipelineConfig) -> Result<()> {
    let mut seen = std::collections::HashSet::new();
    for target in &config.targets {
        if target.name.trim().is_empty() {
            return Err(CairnError::Configuration {
                message: "target with empty name".to_string(),
            });
        }
        if !seen.insert(target.name.to_lowercase()) {
            return Err(CairnError::Configuration {
                message: format!("duplicate target name '{}'", target.name),
            });
        }
    }

    let mut param_names = std::collections::HashSet::new();
    for param in &config.parameters {
        if !param_names.insert(param.name.to_lowercase()) {
            return Err(CairnError::Configuration {
                message: format!("duplicate parameter name '{}'", param.name),
            });
        }
    }

    let target_names: std::collections::HashSet<String> = config
        .targets
        .iter()
        .map(|t| t.name.to_lowercase())
        .collect();
    let producer_has_artifacts: std::collections::HashMap<String, bool> = config
        .targets
        .iter()
        .map(|t| (t.name.to_lowercase(), !t.produces.is_empty()))
        .collect();

    for target in &config.targets {
        for dep in target
            .depends_on
            .iter()
            .chain(&target.before)
            .chain(&target.after)
        {
            if !target_names.contains(&dep.to_lowercase()) {
                return Err(CairnError::Configuration {
                    message: format!(
                        "target '{}' references unknown target '{}'",
                        target.name, dep
                    ),
                });
            }
        }

        for consumed in &target.consumes {
            match producer_has_artifacts.get(&consumed.to_lowercase()) {
                None => {
                    return Err(CairnError::Configuration {
                        message: format!(
                            "target '{}' consumes unknown target '{}'",
                            target.name, consumed
                        ),
                    });
                }
                Some(false) => {
                    return Err(CairnError::Configuration {
                        message: format!(
                            "target '{}' consumes '{}', which declares no produces patterns",
                            target.name, consumed
                        ),
                    });
                }
                Some(true) => {}
            }
        }

        for required in &target.requires {
            if !param_names.contains(&required.to_lowercase()) {
                return Err(CairnError::Configuration {
                    message: format!(
                        "target '{}' requires undeclared parameter '{}'",
                        target.name, required
                    ),
                });
            }
        }
    }

    if let Some(workflow) = &config.workflow {
        for invoked in &workflow.invoked_targets {
            if !target_names.contains(&invoked.to_lowercase()) {
                return Err(CairnError::Configuration {
                    message: format!("workflow invokes unknown target '{}'", invoked),
                });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_pipeline(dir: &TempDir, content: &str) {
        fs::write(dir.path().join("cairn.yml"), content).unwrap();
    }

    #[test]
    fn load_missing_file_reports_not_found() {
        let temp = TempDir::new().unwrap();
        let result = load_config(temp.path(), None);
        assert!(matches!(result, Err(CairnError::ConfigNotFound { .. })));
    }

    #[test]
    fn load_parses_valid_pipeline() {
        let temp = TempDir::new().unwrap();
        write_pipeline(
            &temp,
            r#"
            targets:
              - name: compile
                run: cargo build
        "#,
        );

        let config = load_config(temp.path(), None).unwrap();
        assert_eq!(config.targets.len(), 1);
    }

    #[test]
    fn load_reports_parse_errors_with_path() {
        let temp = TempDir::new().unwrap();
        write_pipeline(&temp, "targets: {not: [valid");

        let result = load_config(temp.path(), None);
        assert!(matches!(result, Err(CairnError::ConfigParse { .. })));
    }

    #[test]
    fn explicit_config_path_wins_over_discovery() {
        let temp = TempDir::new().unwrap();
        write_pipeline(&temp, "targets: []");
        let other = temp.path().join("other.yml");
        fs::write(&other, "targets:\n  - name: only\n").unwrap();

        let config = load_config(temp.path(), Some(&other)).unwrap();
        assert_eq!(config.targets[0].name, "only");
    }

    #[test]
    fn duplicate_target_names_rejected_case_insensitively() {
        let config: PipelineConfig = serde_yaml::from_str(
            r#"
            targets:
              - name: Compile
              - name: compile
        "#,
        )
        .unwrap();

        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("duplicate target name"));
    }

    #[test]
    fn unknown_dependency_rejected() {
        let config: PipelineConfig = serde_yaml::from_str(
            r#"
            targets:
              - name: compile
                depends_on: [restore]
        "#,
        )
        .unwrap();

        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("unknown target 'restore'"));
    }

    #[test]
    fn consuming_target_without_produces_rejected() {
        let config: PipelineConfig = serde_yaml::from_str(
            r#"
            targets:
              - name: pack
              - name: publish
                consumes: [pack]
        "#,
        )
        .unwrap();

        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("declares no produces"));
    }

    #[test]
    fn undeclared_required_parameter_rejected() {
        let config: PipelineConfig = serde_yaml::from_str(
            r#"
            targets:
              - name: publish
                requires: [feed-url]
        "#,
        )
        .unwrap();

        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("undeclared parameter 'feed-url'"));
    }

    #[test]
    fn workflow_invoking_unknown_target_rejected() {
        let config: PipelineConfig = serde_yaml::from_str(
            r#"
            targets:
              - name: compile
            workflow:
              name: cd
              invoked_targets: [ci]
        "#,
        )
        .unwrap();

        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("unknown target 'ci'"));
    }

    #[test]
    fn dependency_references_are_case_insensitive() {
        let config: PipelineConfig = serde_yaml::from_str(
            r#"
            targets:
              - name: Restore
              - name: compile
                depends_on: [restore]
        "#,
        )
        .unwrap();

        assert!(validate_config(&config).is_ok());
    }
}
