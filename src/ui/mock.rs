//! Mock UI for tests.

use std::collections::HashMap;

use super::{OutputMode, Prompt, PromptResult, SpinnerHandle, UserInterface};
use crate::error::Result;

/// Records output and answers prompts from canned responses.
#[derive(Default)]
pub struct MockUi {
    interactive: bool,
    messages: Vec<String>,
    errors: Vec<String>,
    prompts_shown: Vec<String>,
    responses: HashMap<String, String>,
}

impl MockUi {
    /// Create a non-interactive mock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle interactivity.
    pub fn set_interactive(&mut self, interactive: bool) {
        self.interactive = interactive;
    }

    /// Set the canned response for a prompt key.
    pub fn set_prompt_response(&mut self, key: &str, response: &str) {
        self.responses.insert(key.to_string(), response.to_string());
    }

    /// Keys of every prompt shown so far.
    pub fn prompts_shown(&self) -> &[String] {
        &self.prompts_shown
    }

    /// Every message and success line shown so far.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Every warning and error line shown so far.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }
}

impl UserInterface for MockUi {
    fn output_mode(&self) -> OutputMode {
        OutputMode::Normal
    }

    fn message(&mut self, msg: &str) {
        self.messages.push(msg.to_string());
    }

    fn success(&mut self, msg: &str) {
        self.messages.push(msg.to_string());
    }

    fn warning(&mut self, msg: &str) {
        self.errors.push(msg.to_string());
    }

    fn error(&mut self, msg: &str) {
        self.errors.push(msg.to_string());
    }

    fn prompt(&mut self, prompt: &Prompt) -> Result<PromptResult> {
        self.prompts_shown.push(prompt.key.clone());
        let answer = self
            .responses
            .get(&prompt.key)
            .cloned()
            .or_else(|| prompt.default.clone())
            .unwrap_or_default();
        Ok(PromptResult::String(answer))
    }

    fn start_spinner(&mut self, _message: &str) -> Box<dyn SpinnerHandle> {
        Box::new(MockSpinner)
    }

    fn is_interactive(&self) -> bool {
        self.interactive
    }
}

/// Spinner that does nothing.
pub struct MockSpinner;

impl SpinnerHandle for MockSpinner {
    fn set_message(&mut self, _msg: &str) {}
    fn finish_success(&mut self, _msg: &str) {}
    fn finish_error(&mut self, _msg: &str) {}
    fn finish_skipped(&mut self, _msg: &str) {}
}
