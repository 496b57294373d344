//! Terminal user interface components.
//!
//! This module provides:
//! - [`UserInterface`] trait for UI abstraction
//! - [`TerminalUi`] for interactive terminal usage
//! - [`NonInteractiveUi`] for CI/headless environments
//! - [`MockUi`] for tests
//!
//! # Example
//!
//! ```
//! use cairn::ui::{create_ui, OutputMode};
//!
//! let mut ui = create_ui(false, OutputMode::Quiet);
//! ui.message("resolving parameters");
//! ```

pub mod mock;
pub mod non_interactive;
pub mod prompts;
pub mod spinner;
pub mod terminal;
pub mod theme;

pub use mock::{MockSpinner, MockUi};
pub use non_interactive::NonInteractiveUi;
pub use prompts::prompt_user;
pub use spinner::{ProgressSpinner, SilentSpinner};
pub use terminal::{create_ui, TerminalUi};
pub use theme::{should_use_colors, CairnTheme};

use crate::error::Result;

/// How much output to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Errors and the final summary only.
    Quiet,
    /// Standard output.
    #[default]
    Normal,
    /// Everything, including per-target diagnostics.
    Verbose,
}

/// Trait for user interface interactions.
///
/// This trait allows mocking the UI in tests.
pub trait UserInterface {
    /// Get the current output mode.
    fn output_mode(&self) -> OutputMode;

    /// Display a message to the user.
    fn message(&mut self, msg: &str);

    /// Display a success message.
    fn success(&mut self, msg: &str);

    /// Display a warning message.
    fn warning(&mut self, msg: &str);

    /// Display an error message.
    fn error(&mut self, msg: &str);

    /// Show a prompt and get user input.
    fn prompt(&mut self, prompt: &Prompt) -> Result<PromptResult>;

    /// Start a spinner for a running target.
    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle>;

    /// Check if running in interactive mode.
    fn is_interactive(&self) -> bool;
}

/// Handle for controlling a spinner.
pub trait SpinnerHandle {
    /// Update the spinner message.
    fn set_message(&mut self, msg: &str);

    /// Mark the operation as successful.
    fn finish_success(&mut self, msg: &str);

    /// Mark the operation as failed.
    fn finish_error(&mut self, msg: &str);

    /// Mark as skipped.
    fn finish_skipped(&mut self, msg: &str);
}

/// A prompt to show to the user.
#[derive(Debug, Clone)]
pub struct Prompt {
    /// Unique key for the prompt (used for mock lookup).
    pub key: String,
    /// The question to display.
    pub question: String,
    /// The type of prompt.
    pub prompt_type: PromptType,
    /// Default value if the user just presses enter.
    pub default: Option<String>,
}

/// The type of prompt.
#[derive(Debug, Clone)]
pub enum PromptType {
    /// Yes/no confirmation.
    Confirm,
    /// Free-form text input.
    Input,
    /// Hidden input for secret values.
    Password,
}

/// Result of a prompt.
#[derive(Debug, Clone)]
pub enum PromptResult {
    /// Boolean result from confirm.
    Bool(bool),
    /// String result from input.
    String(String),
}

impl PromptResult {
    /// Get as string.
    pub fn as_string(&self) -> String {
        match self {
            Self::Bool(b) => b.to_string(),
            Self::String(s) => s.clone(),
        }
    }

    /// Get as bool if this is a Bool result.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }
}
