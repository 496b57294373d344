//! Scrubbing of secret values from diagnostic text.

use crate::params::secret::{SecretValue, REDACTED};

/// Replaces registered secret values in any string with [`REDACTED`].
///
/// The executor routes all captured action output and failure messages
/// through one redactor before they are stored in a report or printed,
/// so a secret handed to an action's environment cannot surface in
/// diagnostics even when the action echoes it.
#[derive(Clone, Default)]
pub struct Redactor {
    values: Vec<String>,
}

impl std::fmt::Debug for Redactor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Redactor")
            .field("values", &self.values.len())
            .finish()
    }
}

impl Redactor {
    /// Create an empty redactor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a secret value. Empty values are ignored.
    pub fn register(&mut self, secret: &SecretValue) {
        if !secret.is_empty() {
            self.values.push(secret.expose().to_string());
        }
    }

    /// Replace every occurrence of every registered value.
    pub fn redact(&self, input: &str) -> String {
        let mut output = input.to_string();
        for value in &self.values {
            output = output.replace(value, REDACTED);
        }
        output
    }

    /// Number of registered values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether any values are registered.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_registered_value() {
        let mut redactor = Redactor::new();
        redactor.register(&SecretValue::new("api-key-123"));

        let output = redactor.redact("pushing with key api-key-123 to feed");
        assert_eq!(output, format!("pushing with key {} to feed", REDACTED));
    }

    #[test]
    fn redacts_multiple_values_and_occurrences() {
        let mut redactor = Redactor::new();
        redactor.register(&SecretValue::new("first"));
        redactor.register(&SecretValue::new("second"));

        let output = redactor.redact("first second first");
        assert!(!output.contains("first"));
        assert!(!output.contains("second"));
    }

    #[test]
    fn ignores_empty_values() {
        let mut redactor = Redactor::new();
        redactor.register(&SecretValue::new(""));

        assert!(redactor.is_empty());
        assert_eq!(redactor.redact("unchanged"), "unchanged");
    }

    #[test]
    fn passthrough_without_registrations() {
        let redactor = Redactor::new();
        assert_eq!(redactor.redact("nothing to hide"), "nothing to hide");
    }
}
