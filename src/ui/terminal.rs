//! Interactive terminal UI.

use console::Term;

use super::{
    prompt_user, NonInteractiveUi, OutputMode, Prompt, PromptResult, SpinnerHandle, UserInterface,
};
use crate::error::Result;
use crate::ui::spinner::ProgressSpinner;
use crate::ui::theme::CairnTheme;

/// UI for interactive terminal sessions.
pub struct TerminalUi {
    term: Term,
    theme: CairnTheme,
    output_mode: OutputMode,
}

impl TerminalUi {
    /// Create a terminal UI with the given output mode.
    pub fn new(output_mode: OutputMode) -> Self {
        Self {
            term: Term::stdout(),
            theme: CairnTheme::new(),
            output_mode,
        }
    }
}

impl UserInterface for TerminalUi {
    fn output_mode(&self) -> OutputMode {
        self.output_mode
    }

    fn message(&mut self, msg: &str) {
        if self.output_mode != OutputMode::Quiet {
            let _ = self.term.write_line(msg);
        }
    }

    fn success(&mut self, msg: &str) {
        if self.output_mode != OutputMode::Quiet {
            let _ = self.term.write_line(&self.theme.format_success(msg));
        }
    }

    fn warning(&mut self, msg: &str) {
        let _ = self.term.write_line(&self.theme.format_warning(msg));
    }

    fn error(&mut self, msg: &str) {
        let _ = self.term.write_line(&self.theme.format_error(msg));
    }

    fn prompt(&mut self, prompt: &Prompt) -> Result<PromptResult> {
        prompt_user(prompt, &self.term)
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        Box::new(ProgressSpinner::start(message))
    }

    fn is_interactive(&self) -> bool {
        true
    }
}

/// Create the right UI for the session.
pub fn create_ui(interactive: bool, output_mode: OutputMode) -> Box<dyn UserInterface> {
    if interactive {
        Box::new(TerminalUi::new(output_mode))
    } else {
        Box::new(NonInteractiveUi::new(output_mode))
    }
}
