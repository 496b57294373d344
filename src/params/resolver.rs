//! Parameter resolution with source precedence.
//!
//! Each declared parameter resolves from, in order: an explicit `--param`
//! override, an environment variable (the declared `env:` name, else the
//! name uppercased with `-`/`.` folded to `_`), an interactive prompt
//! (only when the session is interactive and the parameter has no
//! default), then the declared default. A `required` parameter left
//! unbound after all sources is a configuration error reported before any
//! target runs.

use std::collections::HashMap;

use crate::config::schema::{ParameterConfig, ParameterKind};
use crate::error::{CairnError, Result};
use crate::params::redact::Redactor;
use crate::params::secret::SecretValue;
use crate::ui::{Prompt, PromptType, UserInterface};

/// A resolved parameter value, secret-aware.
#[derive(Debug, Clone)]
pub enum ParameterValue {
    Plain(String),
    Secret(SecretValue),
}

impl ParameterValue {
    /// The underlying value. Exposes secrets; callers hand this to action
    /// environments and condition checks, never to output.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Plain(v) => v,
            Self::Secret(v) => v.expose(),
        }
    }

    /// Whether this value came from a secret declaration.
    pub fn is_secret(&self) -> bool {
        matches!(self, Self::Secret(_))
    }

    /// Printable form: the value, or the redaction placeholder.
    pub fn display_value(&self) -> String {
        match self {
            Self::Plain(v) => v.clone(),
            Self::Secret(v) => v.to_string(),
        }
    }
}

/// The set of resolved parameters for one run, keyed case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct ResolvedParameters {
    values: HashMap<String, ParameterValue>,
}

impl ResolvedParameters {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value under the folded name.
    pub fn insert(&mut self, name: &str, value: ParameterValue) {
        self.values.insert(name.to_lowercase(), value);
    }

    /// Look up a parameter.
    pub fn get(&self, name: &str) -> Option<&ParameterValue> {
        self.values.get(&name.to_lowercase())
    }

    /// Whether the parameter resolved to a non-empty value.
    pub fn is_bound(&self, name: &str) -> bool {
        self.get(name).is_some_and(|v| !v.as_str().is_empty())
    }

    /// Iterate over (folded name, value) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParameterValue)> {
        self.values.iter()
    }
}

/// Parse a `--param name=value` argument.
pub fn parse_override(raw: &str) -> Result<(String, String)> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(CairnError::Configuration {
            message: format!("invalid --param '{}', expected name=value", raw),
        }),
    }
}

/// Derive the environment variable name for a parameter.
fn derived_env_name(name: &str) -> String {
    name.to_uppercase().replace(['-', '.'], "_")
}

/// Resolves declared parameters from their sources.
pub struct ParameterResolver<'a> {
    specs: &'a [ParameterConfig],
    overrides: HashMap<String, String>,
    env: HashMap<String, String>,
}

impl<'a> ParameterResolver<'a> {
    /// Create a resolver over the declared parameters, snapshotting the
    /// process environment.
    pub fn new(specs: &'a [ParameterConfig]) -> Self {
        Self {
            specs,
            overrides: HashMap::new(),
            env: std::env::vars().collect(),
        }
    }

    /// Set explicit `--param` overrides (highest precedence).
    pub fn with_overrides(mut self, overrides: impl IntoIterator<Item = (String, String)>) -> Self {
        self.overrides = overrides
            .into_iter()
            .map(|(k, v)| (k.to_lowercase(), v))
            .collect();
        self
    }

    /// Replace the environment snapshot (used by tests).
    pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
        self.env = env;
        self
    }

    /// Resolve every declared parameter.
    ///
    /// Resolved secrets are registered with `redactor` so no later
    /// diagnostic can carry them verbatim. Fails when a `required`
    /// parameter stays unbound or a value does not fit its declared kind.
    pub fn resolve(
        &self,
        ui: &mut dyn UserInterface,
        redactor: &mut Redactor,
    ) -> Result<ResolvedParameters> {
        let mut resolved = ResolvedParameters::new();

        for spec in self.specs {
            let value = self.resolve_one(spec, ui)?;

            if let Some(raw) = value {
                validate_kind(spec, &raw)?;
                let value = if spec.secret {
                    let secret = SecretValue::new(raw);
                    redactor.register(&secret);
                    ParameterValue::Secret(secret)
                } else {
                    ParameterValue::Plain(raw)
                };
                resolved.insert(&spec.name, value);
            }

            if spec.required && !resolved.is_bound(&spec.name) {
                return Err(CairnError::Configuration {
                    message: format!("parameter '{}' is required but not set", spec.name),
                });
            }
        }

        Ok(resolved)
    }

    fn resolve_one(
        &self,
        spec: &ParameterConfig,
        ui: &mut dyn UserInterface,
    ) -> Result<Option<String>> {
        if let Some(value) = self.overrides.get(&spec.name.to_lowercase()) {
            return Ok(Some(value.clone()));
        }

        let env_name = spec
            .env
            .clone()
            .unwrap_or_else(|| derived_env_name(&spec.name));
        if let Some(value) = self.env.get(&env_name) {
            if !value.is_empty() {
                return Ok(Some(value.clone()));
            }
        }

        if spec.default.is_none() && ui.is_interactive() {
            let question = match &spec.description {
                Some(desc) => format!("{} ({})", spec.name, desc),
                None => spec.name.clone(),
            };
            let prompt = Prompt {
                key: format!("param_{}", spec.name),
                question,
                prompt_type: if spec.secret {
                    PromptType::Password
                } else {
                    PromptType::Input
                },
                default: None,
            };
            let answer = ui.prompt(&prompt)?.as_string();
            if !answer.is_empty() {
                return Ok(Some(answer));
            }
            return Ok(None);
        }

        Ok(spec.default.clone())
    }
}

fn validate_kind(spec: &ParameterConfig, raw: &str) -> Result<()> {
    match spec.kind {
        ParameterKind::String | ParameterKind::Path => Ok(()),
        ParameterKind::Bool => {
            if raw.eq_ignore_ascii_case("true") || raw.eq_ignore_ascii_case("false") {
                Ok(())
            } else {
                Err(CairnError::Configuration {
                    message: format!("parameter '{}' expects true or false", spec.name),
                })
            }
        }
    }
}
