//! User interface for the planner CLI.
//!
//! This module provides:
//! - [`UserInterface`] trait so commands and decisions can be driven by a mock
//! - [`TerminalUI`] for interactive terminal usage
//! - [`NonInteractiveUI`] for scripted/headless runs
//! - [`MockUI`] capturing output and scripted prompt answers for tests
//!
//! # Example
//!
//! ```
//! use planner::ui::{MockUI, UserInterface};
//!
//! let mut ui = MockUI::new();
//! ui.show_header("Plan Review Checkpoint");
//! ui.success("Plan approved");
//! assert!(ui.has_success("approved"));
//! ```

pub mod mock;
pub mod non_interactive;
pub mod output;
pub mod prompts;
pub mod terminal;
pub mod theme;

pub use mock::MockUI;
pub use non_interactive::NonInteractiveUI;
pub use output::OutputMode;
pub use prompts::prompt_user;
pub use terminal::{create_ui, TerminalUI};
pub use theme::{should_use_colors, PlannerTheme};

use crate::error::Result;

/// Trait for user interface interactions.
pub trait UserInterface {
    /// Get the current output mode.
    fn output_mode(&self) -> OutputMode;

    /// Display a message to the user.
    fn message(&mut self, msg: &str);

    /// Display a success message.
    fn success(&mut self, msg: &str);

    /// Display a warning message.
    fn warning(&mut self, msg: &str);

    /// Display an error message.
    fn error(&mut self, msg: &str);

    /// Show a contextual hint (e.g. the command to run next).
    fn show_hint(&mut self, hint: &str);

    /// Show a prompt and get user input.
    fn prompt(&mut self, prompt: &Prompt) -> Result<PromptResult>;

    /// Show a header/banner.
    fn show_header(&mut self, title: &str);

    /// Show progress (e.g., "Step 3 of 14").
    fn show_progress(&mut self, current: usize, total: usize);

    /// Check if running in interactive mode.
    fn is_interactive(&self) -> bool;
}

/// A prompt to show to the user.
#[derive(Debug, Clone)]
pub struct Prompt {
    /// Unique key for the prompt (used for lookup and env overrides).
    pub key: String,
    /// The question to display.
    pub question: String,
    /// The type of prompt.
    pub prompt_type: PromptType,
    /// Default value if user just presses enter.
    pub default: Option<String>,
}

/// The type of prompt.
#[derive(Debug, Clone)]
pub enum PromptType {
    /// Free-form text input.
    Input,
    /// Select one from a list of options.
    Select { options: Vec<PromptOption> },
}

/// An option in a select prompt.
#[derive(Debug, Clone)]
pub struct PromptOption {
    /// Display label.
    pub label: String,
    /// Value returned when selected.
    pub value: String,
}

/// Result of a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptResult {
    /// String result from input or select.
    String(String),
}

impl PromptResult {
    /// Get as string.
    pub fn as_string(&self) -> String {
        match self {
            Self::String(s) => s.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_result_as_string() {
        assert_eq!(
            PromptResult::String("approve".to_string()).as_string(),
            "approve"
        );
    }

    #[test]
    fn prompt_type_select_stores_options() {
        let prompt_type = PromptType::Select {
            options: vec![PromptOption {
                label: "Skip".to_string(),
                value: "skip".to_string(),
            }],
        };

        let PromptType::Select { options } = prompt_type else {
            panic!("Expected Select variant");
        };
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].value, "skip");
    }
}
