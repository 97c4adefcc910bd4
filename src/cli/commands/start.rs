//! Start command implementation.
//!
//! The `planner start` command creates a run at step 1.

use tracing::info;

use crate::cli::args::StartArgs;
use crate::error::Result;
use crate::runner::{NextAction, Transition};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult, ProjectContext};
use super::display;

/// The start command implementation.
pub struct StartCommand {
    project: ProjectContext,
    args: StartArgs,
}

impl StartCommand {
    /// Create a new start command.
    pub fn new(project: ProjectContext, args: StartArgs) -> Self {
        Self { project, args }
    }
}

impl Command for StartCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let store = self.project.store();
        if store.exists() && !self.args.force {
            ui.error(&format!(
                "A planning run already exists at {}",
                store.path().display()
            ));
            ui.show_hint("planner status, or planner start --force to replace it");
            return Ok(CommandResult::failure(2));
        }

        let config = self.project.config()?;
        let sequencer = self.project.sequencer(&config)?;
        let threshold = config.threshold(self.args.qr_confidence_threshold);

        // Rejects an invalid threshold before anything is written.
        let context = sequencer.start(threshold)?;
        if self.args.force {
            store.clear()?;
            info!("Replaced the previous run at {}", store.path().display());
        }
        store.save(&context)?;

        ui.success(&format!(
            "Planning run started (confidence threshold {})",
            display::format_confidence(context.confidence_threshold)
        ));

        let first = context.current_step;
        let transition = Transition {
            context,
            action: NextAction::Proceed { step: first },
        };
        display::show_transition(ui, sequencer.workflow(), &transition);

        Ok(CommandResult::success())
    }
}
