//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::path::{Path, PathBuf};

use crate::cli::args::{Cli, Commands, StatusArgs};
use crate::config::{load_config, PlannerConfig};
use crate::error::Result;
use crate::runner::StepSequencer;
use crate::state::RunStore;
use crate::ui::UserInterface;

/// Trait for command implementations.
///
/// Each CLI subcommand implements this trait to provide its execution logic.
pub trait Command {
    /// Execute the command.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Where a command runs: the project and its optional extra config file.
#[derive(Debug, Clone)]
pub struct ProjectContext {
    pub root: PathBuf,
    pub config_path: Option<PathBuf>,
}

impl ProjectContext {
    /// Create a context for a project root.
    pub fn new(root: impl Into<PathBuf>, config_path: Option<PathBuf>) -> Self {
        Self {
            root: root.into(),
            config_path,
        }
    }

    /// Load the merged configuration.
    pub fn config(&self) -> Result<PlannerConfig> {
        load_config(&self.root, self.config_path.as_deref())
    }

    /// A sequencer over the configured workflow.
    pub fn sequencer(&self, config: &PlannerConfig) -> Result<StepSequencer> {
        Ok(StepSequencer::new(config.workflow()?))
    }

    /// The project's run store.
    pub fn store(&self) -> RunStore {
        RunStore::new(&self.root)
    }
}

/// Report that there is no run to work on.
pub fn missing_run(ui: &mut dyn UserInterface, store: &RunStore) -> CommandResult {
    ui.error(&format!(
        "No planning run found at {}",
        store.path().display()
    ));
    ui.show_hint("planner start");
    CommandResult::failure(2)
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    project: ProjectContext,
}

impl CommandDispatcher {
    /// Create a new dispatcher for the given project root.
    pub fn new(project_root: PathBuf, config_path: Option<PathBuf>) -> Self {
        Self {
            project: ProjectContext::new(project_root, config_path),
        }
    }

    /// Get the project root path.
    pub fn project_root(&self) -> &Path {
        &self.project.root
    }

    /// Dispatch and execute a command.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let project = self.project.clone();
        match &cli.command {
            Some(Commands::Start(args)) => {
                super::start::StartCommand::new(project, args.clone()).execute(ui)
            }
            Some(Commands::Complete(args)) => {
                super::complete::CompleteCommand::new(project, args.clone()).execute(ui)
            }
            Some(Commands::Decide(args)) => {
                super::decide::DecideCommand::new(project, args.clone()).execute(ui)
            }
            Some(Commands::Status(args)) => {
                super::status::StatusCommand::new(project, args.clone()).execute(ui)
            }
            Some(Commands::Show(args)) => {
                super::show::ShowCommand::new(project, args.clone()).execute(ui)
            }
            Some(Commands::Completions(args)) => {
                super::completions::CompletionsCommand::new(args.clone()).execute(ui)
            }
            None => super::status::StatusCommand::new(project, StatusArgs::default()).execute(ui),
        }
    }
}
