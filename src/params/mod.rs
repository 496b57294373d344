//! Parameter resolution, secrets, and redaction.
//!
//! Parameters bind from explicit overrides, the environment, interactive
//! prompts, or declared defaults (in that order). Secret values live in
//! [`SecretValue`] and are scrubbed from diagnostics by the run's
//! [`Redactor`]; only their presence is ever reported.

pub mod redact;
pub mod resolver;
pub mod secret;

pub use redact::Redactor;
pub use resolver::{parse_override, ParameterResolver, ParameterValue, ResolvedParameters};
pub use secret::{SecretValue, REDACTED};
