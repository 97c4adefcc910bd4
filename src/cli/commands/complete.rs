//! Complete command implementation.
//!
//! The `planner complete` command reports the result of the current step,
//! advances the run and prints what to do next.

use tracing::debug;

use crate::cli::args::{CompleteArgs, QrStatus};
use crate::error::Result;
use crate::runner::{
    parse_checkpoint_decision, prompt_checkpoint, request_gate_decision, NextAction, RunContext,
    RunPhase, StepResult, StepSequencer, Transition,
};
use crate::steps::StepId;
use crate::ui::UserInterface;

use super::dispatcher::{missing_run, Command, CommandResult, ProjectContext};
use super::display;

/// The complete command implementation.
pub struct CompleteCommand {
    project: ProjectContext,
    args: CompleteArgs,
}

impl CompleteCommand {
    /// Create a new complete command.
    pub fn new(project: ProjectContext, args: CompleteArgs) -> Self {
        Self { project, args }
    }

    /// Build the step result from the flags, asking for a checkpoint
    /// decision when none was given.
    fn step_result(&self, ctx: &RunContext, ui: &mut dyn UserInterface) -> Result<StepResult> {
        let step = self.args.step;

        if let Some(raw) = &self.args.decision {
            let decision = parse_checkpoint_decision(raw, self.args.feedback.as_deref())?;
            return Ok(StepResult {
                step,
                ..StepResult::checkpoint(decision)
            });
        }

        if let Some(status) = self.args.qr_status {
            return Ok(StepResult::quality(
                step,
                status == QrStatus::Pass,
                self.args.findings,
            ));
        }

        let awaiting_checkpoint = step == StepId::Checkpoint
            && ctx.current_step == StepId::Checkpoint
            && ctx.phase == RunPhase::Running;
        if awaiting_checkpoint {
            let decision = prompt_checkpoint(ui)?;
            return Ok(StepResult::checkpoint(decision));
        }

        Ok(StepResult::done(step))
    }

    /// Let an interactive user resolve an escalation right away.
    fn resolve_inline(
        &self,
        sequencer: &StepSequencer,
        transition: Transition,
        ui: &mut dyn UserInterface,
    ) -> Result<Transition> {
        let NextAction::Decide { prompt } = &transition.action else {
            return Ok(transition);
        };
        if !ui.is_interactive() || self.args.non_interactive {
            return Ok(transition);
        }

        display::show_decision(ui, prompt);
        let (choice, feedback) = request_gate_decision(ui, prompt)?;
        let feedback = feedback.or_else(|| self.args.feedback.clone());
        sequencer.resolve_decision(&transition.context, choice, feedback.as_deref())
    }
}

impl Command for CompleteCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let store = self.project.store();
        if !store.exists() {
            return Ok(missing_run(ui, &store));
        }

        let config = self.project.config()?;
        let sequencer = self.project.sequencer(&config)?;
        let context = store.load()?.context;

        let result = self.step_result(&context, ui)?;
        debug!("Reporting {:?}", result);

        let transition = sequencer.advance(&context, &result)?;
        let transition = self.resolve_inline(&sequencer, transition, ui)?;

        store.save(&transition.context)?;
        display::show_transition(ui, sequencer.workflow(), &transition);

        Ok(CommandResult::success())
    }
}
