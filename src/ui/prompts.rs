//! Interactive prompts backed by dialoguer.

use console::{style, Term};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};

use crate::error::{PlannerError, Result};

use super::{Prompt, PromptOption, PromptResult, PromptType};

fn map_dialoguer_err(e: dialoguer::Error) -> PlannerError {
    PlannerError::Io(e.into())
}

/// Dialoguer theme without the default yellow `?` prefix.
fn prompt_theme() -> ColorfulTheme {
    ColorfulTheme {
        prompt_prefix: style("".to_string()),
        ..ColorfulTheme::default()
    }
}

/// Prompt the user for input on a terminal.
pub fn prompt_user(prompt: &Prompt, term: &Term) -> Result<PromptResult> {
    match &prompt.prompt_type {
        PromptType::Input => prompt_input(prompt, term),
        PromptType::Select { options } => prompt_select(prompt, options, term),
    }
}

fn prompt_input(prompt: &Prompt, term: &Term) -> Result<PromptResult> {
    let theme = prompt_theme();
    let input = Input::<String>::with_theme(&theme)
        .with_prompt(&prompt.question)
        .allow_empty(true);

    let result = match &prompt.default {
        Some(default) => input
            .default(default.clone())
            .show_default(!default.is_empty())
            .interact_text_on(term),
        None => input.interact_text_on(term),
    }
    .map_err(map_dialoguer_err)?;

    Ok(PromptResult::String(result))
}

fn prompt_select(prompt: &Prompt, options: &[PromptOption], term: &Term) -> Result<PromptResult> {
    let labels: Vec<_> = options.iter().map(|o| o.label.as_str()).collect();
    let theme = prompt_theme();

    let mut select = Select::with_theme(&theme)
        .with_prompt(&prompt.question)
        .items(&labels);

    // Decisions carry no default; the cursor just starts on the first entry.
    if let Some(idx) = prompt
        .default
        .as_ref()
        .and_then(|d| options.iter().position(|o| o.value == *d))
    {
        select = select.default(idx);
    }

    let selection = select.interact_on(term).map_err(map_dialoguer_err)?;

    Ok(PromptResult::String(options[selection].value.clone()))
}
