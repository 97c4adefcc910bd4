//! Decide command implementation.
//!
//! The `planner decide` command resolves a gate escalation left pending by
//! `planner complete`.

use crate::cli::args::DecideArgs;
use crate::error::{PlannerError, Result};
use crate::runner::{parse_gate_choice, request_gate_decision};
use crate::ui::UserInterface;

use super::dispatcher::{missing_run, Command, CommandResult, ProjectContext};
use super::display;

/// The decide command implementation.
pub struct DecideCommand {
    project: ProjectContext,
    args: DecideArgs,
}

impl DecideCommand {
    /// Create a new decide command.
    pub fn new(project: ProjectContext, args: DecideArgs) -> Self {
        Self { project, args }
    }
}

impl Command for DecideCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let store = self.project.store();
        if !store.exists() {
            return Ok(missing_run(ui, &store));
        }

        let config = self.project.config()?;
        let sequencer = self.project.sequencer(&config)?;
        let context = store.load()?.context;

        let prompt = context
            .pending_decision()
            .ok_or(PlannerError::NoPendingDecision {
                step: context.current_step,
            })?;

        let (choice, feedback) = match &self.args.choice {
            Some(raw) => (parse_gate_choice(prompt, raw)?, self.args.feedback.clone()),
            None => {
                display::show_decision(ui, prompt);
                let (choice, feedback) = request_gate_decision(ui, prompt)?;
                (choice, feedback.or_else(|| self.args.feedback.clone()))
            }
        };

        let transition = sequencer.resolve_decision(&context, choice, feedback.as_deref())?;
        store.save(&transition.context)?;
        display::show_transition(ui, sequencer.workflow(), &transition);

        Ok(CommandResult::success())
    }
}
