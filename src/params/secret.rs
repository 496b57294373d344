//! Redacting wrapper for secret parameter values.

use serde::{Serialize, Serializer};
use std::fmt;

/// Placeholder written wherever a secret value would otherwise appear.
pub const REDACTED: &str = "[REDACTED]";

/// A secret value that refuses to print itself.
///
/// `Display`, `Debug`, and `Serialize` all emit [`REDACTED`]; the wrapped
/// value is only reachable through [`SecretValue::expose`], which call
/// sites use to hand the value to an action's environment.
///
/// # Example
///
/// ```
/// use cairn::params::SecretValue;
///
/// let key = SecretValue::new("nuget-api-key-123");
/// assert_eq!(format!("{}", key), "[REDACTED]");
/// assert_eq!(format!("{:?}", key), "[REDACTED]");
/// assert_eq!(key.expose(), "nuget-api-key-123");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct SecretValue(String);

impl SecretValue {
    /// Wrap a resolved secret value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Access the wrapped value.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Whether the wrapped value is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

impl Serialize for SecretValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(REDACTED)
    }
}
