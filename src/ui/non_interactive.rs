//! Headless UI for CI and piped sessions.

use super::{OutputMode, Prompt, PromptResult, SpinnerHandle, UserInterface};
use crate::error::{CairnError, Result};
use crate::ui::spinner::SilentSpinner;
use crate::ui::theme::CairnTheme;

/// UI that never prompts: questions resolve to their defaults or fail.
pub struct NonInteractiveUi {
    theme: CairnTheme,
    output_mode: OutputMode,
}

impl NonInteractiveUi {
    /// Create a non-interactive UI.
    pub fn new(output_mode: OutputMode) -> Self {
        Self {
            theme: CairnTheme::plain(),
            output_mode,
        }
    }
}

impl UserInterface for NonInteractiveUi {
    fn output_mode(&self) -> OutputMode {
        self.output_mode
    }

    fn message(&mut self, msg: &str) {
        if self.output_mode != OutputMode::Quiet {
            println!("{msg}");
        }
    }

    fn success(&mut self, msg: &str) {
        if self.output_mode != OutputMode::Quiet {
            println!("{}", self.theme.format_success(msg));
        }
    }

    fn warning(&mut self, msg: &str) {
        eprintln!("{}", self.theme.format_warning(msg));
    }

    fn error(&mut self, msg: &str) {
        eprintln!("{}", self.theme.format_error(msg));
    }

    fn prompt(&mut self, prompt: &Prompt) -> Result<PromptResult> {
        match &prompt.default {
            Some(default) => Ok(PromptResult::String(default.clone())),
            None => Err(CairnError::Configuration {
                message: format!(
                    "cannot prompt for '{}' in a non-interactive session",
                    prompt.key
                ),
            }),
        }
    }

    fn start_spinner(&mut self, _message: &str) -> Box<dyn SpinnerHandle> {
        Box::new(SilentSpinner::new())
    }

    fn is_interactive(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::PromptType;

    #[test]
    fn prompt_returns_default_when_present() {
        let mut ui = NonInteractiveUi::new(OutputMode::Normal);
        let prompt = Prompt {
            key: "mode".into(),
            question: "Which mode?".into(),
            prompt_type: PromptType::Input,
            default: Some("fast".into()),
        };

        let result = ui.prompt(&prompt).unwrap();
        assert_eq!(result.as_string(), "fast");
    }

    #[test]
    fn prompt_without_default_errors() {
        let mut ui = NonInteractiveUi::new(OutputMode::Normal);
        let prompt = Prompt {
            key: "token".into(),
            question: "Token?".into(),
            prompt_type: PromptType::Password,
            default: None,
        };

        assert!(ui.prompt(&prompt).is_err());
    }
}
