//! Non-interactive UI for scripted and headless runs.
//!
//! Agents driving the planner pass their decisions as flags, so prompts only
//! resolve from `PLANNER_PROMPT_<KEY>` environment variables or a prompt
//! default. Anything else is an error rather than a guess.

use std::collections::HashMap;

use crate::error::{PlannerError, Result};

use super::{OutputMode, Prompt, PromptResult, UserInterface};

/// Prefix of environment variables that answer prompts.
pub const PROMPT_ENV_PREFIX: &str = "PLANNER_PROMPT_";

/// UI implementation for non-interactive mode.
pub struct NonInteractiveUI {
    mode: OutputMode,
    env_overrides: HashMap<String, String>,
}

impl NonInteractiveUI {
    /// Create a new non-interactive UI, reading prompt answers from the environment.
    pub fn new(mode: OutputMode) -> Self {
        let env_overrides = std::env::vars()
            .filter(|(k, _)| k.starts_with(PROMPT_ENV_PREFIX))
            .collect();

        Self {
            mode,
            env_overrides,
        }
    }

    /// Create with explicit overrides (for testing).
    pub fn with_overrides(mode: OutputMode, overrides: HashMap<String, String>) -> Self {
        Self {
            mode,
            env_overrides: overrides,
        }
    }
}

impl UserInterface for NonInteractiveUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        println!("{}", msg);
    }

    fn success(&mut self, msg: &str) {
        println!("✓ {}", msg);
    }

    fn warning(&mut self, msg: &str) {
        eprintln!("⚠ {}", msg);
    }

    fn error(&mut self, msg: &str) {
        eprintln!("✗ {}", msg);
    }

    fn show_hint(&mut self, hint: &str) {
        println!("→ {}", hint);
    }

    fn prompt(&mut self, prompt: &Prompt) -> Result<PromptResult> {
        let env_key = format!("{}{}", PROMPT_ENV_PREFIX, prompt.key.to_uppercase());
        if let Some(value) = self.env_overrides.get(&env_key) {
            return Ok(PromptResult::String(value.clone()));
        }

        if let Some(default) = &prompt.default {
            return Ok(PromptResult::String(default.clone()));
        }

        Err(PlannerError::PromptUnanswered {
            key: prompt.key.clone(),
            env_key,
        })
    }

    fn show_header(&mut self, title: &str) {
        println!("\n{}\n", title);
    }

    fn show_progress(&mut self, current: usize, total: usize) {
        if self.mode.shows_guidance() {
            println!("[{}/{}]", current, total);
        }
    }

    fn is_interactive(&self) -> bool {
        false
    }
}
