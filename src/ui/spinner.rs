//! Spinner for running targets.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use super::SpinnerHandle;
use crate::ui::theme::CairnTheme;

/// An indicatif-backed spinner for one running target.
pub struct ProgressSpinner {
    bar: ProgressBar,
    theme: CairnTheme,
}

impl ProgressSpinner {
    /// Start a spinner with the given message.
    pub fn start(message: &str) -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("  {spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(80));
        Self {
            bar,
            theme: CairnTheme::new(),
        }
    }
}

impl SpinnerHandle for ProgressSpinner {
    fn set_message(&mut self, msg: &str) {
        self.bar.set_message(msg.to_string());
    }

    fn finish_success(&mut self, msg: &str) {
        self.bar
            .finish_with_message(self.theme.format_success(msg));
    }

    fn finish_error(&mut self, msg: &str) {
        self.bar.finish_with_message(self.theme.format_error(msg));
    }

    fn finish_skipped(&mut self, msg: &str) {
        self.bar
            .finish_with_message(self.theme.format_skipped(msg));
    }
}

/// Spinner for non-interactive sessions: prints terminal states only.
pub struct SilentSpinner {
    theme: CairnTheme,
}

impl SilentSpinner {
    /// Create a silent spinner.
    pub fn new() -> Self {
        Self {
            theme: CairnTheme::plain(),
        }
    }
}

impl Default for SilentSpinner {
    fn default() -> Self {
        Self::new()
    }
}

impl SpinnerHandle for SilentSpinner {
    fn set_message(&mut self, _msg: &str) {}

    fn finish_success(&mut self, msg: &str) {
        println!("  {}", self.theme.format_success(msg));
    }

    fn finish_error(&mut self, msg: &str) {
        eprintln!("  {}", self.theme.format_error(msg));
    }

    fn finish_skipped(&mut self, msg: &str) {
        println!("  {}", self.theme.format_skipped(msg));
    }
}
