//! Command-line interface for the planner.
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations

pub mod args;
pub mod commands;

pub use args::{
    Cli, Commands, CompleteArgs, CompletionsArgs, DecideArgs, QrStatus, ShowArgs, StartArgs,
    StatusArgs,
};
pub use commands::{Command, CommandDispatcher, CommandResult, ProjectContext};
