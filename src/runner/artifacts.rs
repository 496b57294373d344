//! Artifact contract verification.
//!
//! After a target's action reports success, every declared `produces`
//! pattern must match at least one file beneath the project root. An
//! action that succeeds without leaving its promised outputs behind is a
//! contract violation, not a success; this is what catches silent no-ops.

use std::path::Path;

use crate::error::{CairnError, Result};
use crate::pipeline::ResolvedTarget;

/// Verify a target's artifact contract.
pub fn verify(target: &ResolvedTarget, project_root: &Path) -> Result<()> {
    for pattern in &target.produces {
        if !pattern_matches_file(pattern, project_root)? {
            return Err(CairnError::ArtifactContract {
                target: target.name.clone(),
                pattern: pattern.clone(),
            });
        }
    }
    Ok(())
}

/// Whether a pattern matches at least one existing file.
fn pattern_matches_file(pattern: &str, project_root: &Path) -> Result<bool> {
    let absolute = project_root.join(pattern);
    let glob_input = absolute.to_string_lossy();

    let entries = glob::glob(&glob_input).map_err(|e| CairnError::Configuration {
        message: format!("invalid produces pattern '{}': {}", pattern, e),
    })?;

    Ok(entries
        .filter_map(|entry| entry.ok())
        .any(|path| path.is_file()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn target_producing(patterns: &[&str]) -> ResolvedTarget {
        let mut target = ResolvedTarget::new("pack");
        target.produces = patterns.iter().map(|p| p.to_string()).collect();
        target
    }

    #[test]
    fn empty_contract_always_holds() {
        let temp = TempDir::new().unwrap();
        let target = ResolvedTarget::new("compile");
        assert!(verify(&target, temp.path()).is_ok());
    }

    #[test]
    fn matching_file_satisfies_contract() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("out")).unwrap();
        fs::write(temp.path().join("out/app.pkg"), "bytes").unwrap();

        let target = target_producing(&["out/*.pkg"]);
        assert!(verify(&target, temp.path()).is_ok());
    }

    #[test]
    fn empty_directory_violates_contract() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("out")).unwrap();

        let target = target_producing(&["out/*.pkg"]);
        let err = verify(&target, temp.path()).unwrap_err();

        match err {
            CairnError::ArtifactContract { target, pattern } => {
                assert_eq!(target, "pack");
                assert_eq!(pattern, "out/*.pkg");
            }
            other => panic!("expected contract violation, got {other}"),
        }
    }

    #[test]
    fn directory_match_does_not_satisfy_contract() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("out/app.pkg")).unwrap();

        let target = target_producing(&["out/*.pkg"]);
        assert!(verify(&target, temp.path()).is_err());
    }

    #[test]
    fn every_pattern_must_match() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("out")).unwrap();
        fs::write(temp.path().join("out/app.pkg"), "bytes").unwrap();

        let target = target_producing(&["out/*.pkg", "reports/*.html"]);
        let err = verify(&target, temp.path()).unwrap_err();
        assert!(err.to_string().contains("reports/*.html"));
    }

    #[test]
    fn recursive_glob_matches_nested_files() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("results/sub")).unwrap();
        fs::write(temp.path().join("results/sub/coverage.xml"), "<x/>").unwrap();

        let target = target_producing(&["results/**/coverage.xml"]);
        assert!(verify(&target, temp.path()).is_ok());
    }
}
