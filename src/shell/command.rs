//! Shell command execution.

use crate::error::{CairnError, Result};
use std::collections::HashMap;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

/// Result of executing a shell command.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Exit code (None if killed by signal).
    pub exit_code: Option<i32>,

    /// Standard output (empty when not captured).
    pub stdout: String,

    /// Standard error (empty when not captured).
    pub stderr: String,

    /// Execution duration.
    pub duration: Duration,

    /// Whether command succeeded (exit code 0).
    pub success: bool,
}

/// Options for command execution.
#[derive(Debug, Clone, Default)]
pub struct CommandOptions {
    /// Working directory.
    pub cwd: Option<std::path::PathBuf>,

    /// Environment variables (merged with the system env).
    pub env: HashMap<String, String>,

    /// Capture stdout/stderr (if false, inherits from parent).
    pub capture: bool,
}

/// Execute a command through the platform shell.
pub fn execute(command: &str, options: &CommandOptions) -> Result<CommandResult> {
    let start = Instant::now();

    let (shell, flag) = platform_shell();
    let mut cmd = Command::new(shell);
    cmd.arg(flag);
    cmd.arg(command);

    if let Some(cwd) = &options.cwd {
        cmd.current_dir(cwd);
    }

    for (key, value) in &options.env {
        cmd.env(key, value);
    }

    if options.capture {
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
    } else {
        cmd.stdout(Stdio::inherit());
        cmd.stderr(Stdio::inherit());
    }

    let output = cmd.output().map_err(|_| CairnError::CommandFailed {
        command: command.to_string(),
        code: None,
    })?;

    let duration = start.elapsed();
    let stdout = if options.capture {
        String::from_utf8_lossy(&output.stdout).to_string()
    } else {
        String::new()
    };
    let stderr = if options.capture {
        String::from_utf8_lossy(&output.stderr).to_string()
    } else {
        String::new()
    };

    Ok(CommandResult {
        exit_code: output.status.code(),
        stdout,
        stderr,
        duration,
        success: output.status.success(),
    })
}

/// Execute a command and return only success/failure.
pub fn execute_check(command: &str, cwd: Option<&std::path::Path>) -> bool {
    let options = CommandOptions {
        cwd: cwd.map(|p| p.to_path_buf()),
        capture: true,
        ..Default::default()
    };

    execute(command, &options).map(|r| r.success).unwrap_or(false)
}

/// The platform shell and its command flag.
fn platform_shell() -> (&'static str, &'static str) {
    #[cfg(unix)]
    {
        ("sh", "-c")
    }
    #[cfg(windows)]
    {
        ("cmd", "/C")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn execute_captures_stdout() {
        let options = CommandOptions {
            capture: true,
            ..Default::default()
        };
        let result = execute("echo hello", &options).unwrap();

        assert!(result.success);
        assert_eq!(result.exit_code, Some(0));
        assert_eq!(result.stdout.trim(), "hello");
    }

    #[cfg(unix)]
    #[test]
    fn execute_reports_exit_code() {
        let options = CommandOptions {
            capture: true,
            ..Default::default()
        };
        let result = execute("exit 7", &options).unwrap();

        assert!(!result.success);
        assert_eq!(result.exit_code, Some(7));
    }

    #[cfg(unix)]
    #[test]
    fn execute_merges_env() {
        let options = CommandOptions {
            capture: true,
            env: HashMap::from([("CAIRN_TEST_VAR".to_string(), "value".to_string())]),
            ..Default::default()
        };
        let result = execute("echo $CAIRN_TEST_VAR", &options).unwrap();
        assert_eq!(result.stdout.trim(), "value");
    }

    #[cfg(unix)]
    #[test]
    fn execute_respects_cwd() {
        let temp = tempfile::TempDir::new().unwrap();
        let options = CommandOptions {
            cwd: Some(temp.path().to_path_buf()),
            capture: true,
            ..Default::default()
        };
        let result = execute("pwd", &options).unwrap();
        let reported = std::fs::canonicalize(result.stdout.trim()).unwrap();
        assert_eq!(reported, std::fs::canonicalize(temp.path()).unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn execute_check_maps_to_bool() {
        assert!(execute_check("true", None));
        assert!(!execute_check("false", None));
    }
}
