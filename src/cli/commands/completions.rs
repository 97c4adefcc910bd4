//! Shell completions generation.
//!
//! The `planner completions` command generates shell completion scripts.

use crate::cli::args::{Cli, CompletionsArgs};
use crate::ui::UserInterface;
use clap::CommandFactory;

use super::dispatcher::{Command, CommandResult};

/// Binary name used in generated scripts.
const BIN_NAME: &str = "planner";

/// The completions command implementation.
pub struct CompletionsCommand {
    args: CompletionsArgs,
}

impl CompletionsCommand {
    /// Create a new completions command.
    pub fn new(args: CompletionsArgs) -> Self {
        Self { args }
    }

    /// Write the completion script for the configured shell.
    pub fn generate(&self, out: &mut dyn std::io::Write) {
        let mut cmd = Cli::command();
        clap_complete::generate(self.args.shell, &mut cmd, BIN_NAME, out);
    }
}

impl Command for CompletionsCommand {
    fn execute(&self, _ui: &mut dyn UserInterface) -> crate::error::Result<CommandResult> {
        self.generate(&mut std::io::stdout());
        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap_complete::Shell;

    fn script(shell: Shell) -> String {
        let mut buf = Vec::new();
        CompletionsCommand::new(CompletionsArgs { shell }).generate(&mut buf);
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn bash_completions_cover_subcommands() {
        let output = script(Shell::Bash);
        assert!(output.contains("planner"));
        assert!(output.contains("complete"));
        assert!(output.contains("decide"));
    }

    #[test]
    fn zsh_completions_name_binary() {
        assert!(script(Shell::Zsh).contains("planner"));
    }

    #[test]
    fn fish_completions_include_flags() {
        assert!(script(Shell::Fish).contains("qr-confidence-threshold"));
    }
}
