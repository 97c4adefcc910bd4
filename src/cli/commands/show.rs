//! Show command implementation.
//!
//! The `planner show` command prints the guidance for a step: the one given
//! with `--step`, the current one, or the whole sequence when no run exists.

use crate::cli::args::ShowArgs;
use crate::error::Result;
use crate::runner::RunPhase;
use crate::steps::{StepKind, Workflow, PLAN_APPROVED};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult, ProjectContext};
use super::display;

/// The show command implementation.
pub struct ShowCommand {
    project: ProjectContext,
    args: ShowArgs,
}

impl ShowCommand {
    /// Create a new show command.
    pub fn new(project: ProjectContext, args: ShowArgs) -> Self {
        Self { project, args }
    }

    fn show_sequence(&self, ui: &mut dyn UserInterface, workflow: &Workflow) {
        ui.show_header("Planning workflow");
        for step in workflow.steps() {
            let line = match (step.kind, workflow.gate_at(step.id)) {
                (StepKind::Gate, Some(gate)) => format!(
                    "  {:>6}  {} [{}, max iterations {}]",
                    step.id,
                    step.title,
                    gate.name,
                    gate.max_iterations
                        .map(|n| n.to_string())
                        .unwrap_or_else(|| "unbounded".to_string())
                ),
                _ => format!("  {:>6}  {}", step.id, step.title),
            };
            ui.message(&line);
        }
        ui.show_hint("planner start");
    }
}

impl Command for ShowCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let config = self.project.config()?;
        let workflow = config.workflow()?;

        if let Some(step) = self.args.step {
            if workflow.step(step).is_none() {
                ui.error(&format!("Step {} is not part of the planning workflow", step));
                return Ok(CommandResult::failure(1));
            }
            display::show_step(ui, &workflow, step, None);
            return Ok(CommandResult::success());
        }

        let store = self.project.store();
        if !store.exists() {
            self.show_sequence(ui, &workflow);
            return Ok(CommandResult::success());
        }

        let ctx = store.load()?.context;
        match &ctx.phase {
            RunPhase::Running => {
                display::show_step(ui, &workflow, ctx.current_step, ctx.fix.as_ref())
            }
            RunPhase::AwaitingDecision { prompt } => display::show_decision(ui, prompt),
            RunPhase::Completed => {
                for line in PLAN_APPROVED {
                    ui.message(line);
                }
            }
            RunPhase::Aborted => {
                ui.warning(&format!("The run was aborted at step {}", ctx.current_step));
                ui.show_hint("planner start --force");
            }
        }

        Ok(CommandResult::success())
    }
}
