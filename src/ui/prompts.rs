//! Interactive prompts.

use console::{style, Term};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Password};

use crate::error::{CairnError, Result};

use super::{Prompt, PromptResult, PromptType};

/// Convert dialoguer errors to CairnError.
fn map_dialoguer_err(e: dialoguer::Error) -> CairnError {
    CairnError::Io(e.into())
}

/// Dialoguer theme without the default yellow `?` prefix.
fn prompt_theme() -> ColorfulTheme {
    ColorfulTheme {
        prompt_prefix: style("".to_string()),
        ..ColorfulTheme::default()
    }
}

/// Prompt the user for input.
pub fn prompt_user(prompt: &Prompt, term: &Term) -> Result<PromptResult> {
    match &prompt.prompt_type {
        PromptType::Confirm => prompt_confirm(prompt, term),
        PromptType::Input => prompt_input(prompt, term),
        PromptType::Password => prompt_password(prompt, term),
    }
}

fn prompt_confirm(prompt: &Prompt, term: &Term) -> Result<PromptResult> {
    let default = prompt
        .default
        .as_ref()
        .map(|s| s.to_lowercase() == "true" || s == "y" || s == "yes")
        .unwrap_or(true);

    let result = Confirm::with_theme(&prompt_theme())
        .with_prompt(&prompt.question)
        .default(default)
        .interact_on(term)
        .map_err(map_dialoguer_err)?;

    Ok(PromptResult::Bool(result))
}

fn prompt_input(prompt: &Prompt, term: &Term) -> Result<PromptResult> {
    let binding = prompt_theme();
    let input = Input::<String>::with_theme(&binding).with_prompt(&prompt.question);

    let result: String = if let Some(default) = &prompt.default {
        input
            .default(default.clone())
            .interact_on(term)
            .map_err(map_dialoguer_err)?
    } else {
        input
            .allow_empty(true)
            .interact_on(term)
            .map_err(map_dialoguer_err)?
    };

    Ok(PromptResult::String(result))
}

/// Secret input: typed characters are never echoed.
fn prompt_password(prompt: &Prompt, term: &Term) -> Result<PromptResult> {
    let result = Password::with_theme(&prompt_theme())
        .with_prompt(&prompt.question)
        .allow_empty_password(true)
        .interact_on(term)
        .map_err(map_dialoguer_err)?;

    Ok(PromptResult::String(result))
}
