//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::steps::StepId;

/// Planner - step sequencer for the plan-writing workflow.
#[derive(Debug, Parser)]
#[command(name = "planner")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to an extra config file (merged over .planner/config.yml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to project root (overrides current directory)
    #[arg(short, long, global = true)]
    pub project: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Whether the invoked command asked not to prompt.
    pub fn non_interactive(&self) -> bool {
        match &self.command {
            Some(Commands::Complete(args)) => args.non_interactive,
            Some(Commands::Decide(args)) => args.non_interactive,
            _ => false,
        }
    }
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start a new planning run
    Start(StartArgs),

    /// Report the result of the current step and advance
    Complete(CompleteArgs),

    /// Resolve a pending quality-gate decision
    Decide(DecideArgs),

    /// Show the state of the current run (default if no command specified)
    Status(StatusArgs),

    /// Show what to do at a step
    Show(ShowArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `start` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct StartArgs {
    /// Confidence (0-100) below which a failing review escalates to the user
    #[arg(long, value_name = "PERCENT")]
    pub qr_confidence_threshold: Option<f64>,

    /// Replace an existing run
    #[arg(short, long)]
    pub force: bool,
}

/// Outcome of a quality review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum QrStatus {
    Pass,
    Fail,
}

/// Arguments for the `complete` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompleteArgs {
    /// Step that finished (1-13 or "review")
    #[arg(short, long)]
    pub step: StepId,

    /// Quality-review outcome (gate steps)
    #[arg(long, value_enum)]
    pub qr_status: Option<QrStatus>,

    /// Number of findings the quality review reported (gate steps)
    #[arg(long, allow_negative_numbers = true)]
    pub findings: Option<i64>,

    /// Checkpoint decision: approve, review-edit, regenerate or save-exit
    #[arg(long)]
    pub decision: Option<String>,

    /// Feedback for plan regeneration
    #[arg(long)]
    pub feedback: Option<String>,

    /// Never prompt; missing decisions are errors
    #[arg(long)]
    pub non_interactive: bool,
}

/// Arguments for the `decide` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct DecideArgs {
    /// Choice: fix, skip, regenerate or abort
    #[arg(long)]
    pub choice: Option<String>,

    /// Feedback for plan regeneration
    #[arg(long)]
    pub feedback: Option<String>,

    /// Never prompt; a missing choice is an error
    #[arg(long)]
    pub non_interactive: bool,
}

/// Arguments for the `status` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct StatusArgs {
    /// Print the run as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `show` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ShowArgs {
    /// Step to show (defaults to the current step)
    #[arg(short, long)]
    pub step: Option<StepId>,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
