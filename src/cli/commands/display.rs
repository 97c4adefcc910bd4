//! Shared display helpers for steps, decisions and transitions.
//!
//! `start`, `complete`, `decide` and `show` all end by telling the
//! collaborator what to do next; the rendering lives here so it reads the
//! same everywhere.

use crate::runner::{DecisionPrompt, FixContext, NextAction, Transition};
use crate::steps::{
    fix_mode_actions, guidance_for, StepId, StepKind, Workflow, WorkflowStep, PLAN_APPROVED,
};
use crate::ui::UserInterface;

const CHECKPOINT_CHOICES: &str = "approve|review-edit|regenerate|save-exit";

/// Heading for a step, e.g. `Step 4: Assumption Surfacing`.
pub fn step_heading(step: &WorkflowStep) -> String {
    match step.kind {
        StepKind::Checkpoint => step.title.to_string(),
        _ => format!("Step {}: {}", step.id, step.title),
    }
}

/// The command that reports a step as finished.
pub fn complete_command(workflow: &Workflow, id: StepId) -> String {
    let kind = workflow.step(id).map(|s| s.kind).unwrap_or(StepKind::Ordinary);
    match kind {
        StepKind::Ordinary => format!("planner complete --step {}", id),
        StepKind::Checkpoint => format!(
            "planner complete --step {} --decision <{}>",
            id, CHECKPOINT_CHOICES
        ),
        StepKind::Gate => format!(
            "planner complete --step {} --qr-status <pass|fail> [--findings <N>]",
            id
        ),
    }
}

/// Confidence as a whole percentage.
pub fn format_confidence(confidence: f64) -> String {
    format!("{:.0}%", confidence)
}

/// Iteration against its limit, e.g. `2/3`.
pub fn iteration_label(iteration: u32, max_iterations: Option<u32>) -> String {
    match max_iterations {
        Some(max) => format!("{}/{}", iteration, max),
        None => format!("{} (unbounded)", iteration),
    }
}

/// Print what to do at a step.
///
/// `fix` adds the fix-mode banner when the step is the work step of the gate
/// being fixed.
pub fn show_step(
    ui: &mut dyn UserInterface,
    workflow: &Workflow,
    id: StepId,
    fix: Option<&FixContext>,
) {
    let Some(step) = workflow.step(id) else {
        ui.warning(&format!("Step {} is not part of the planning workflow", id));
        return;
    };

    ui.show_header(&step_heading(step));
    if let Some(pos) = workflow.position(id) {
        ui.show_progress(pos + 1, workflow.steps().len());
    }

    let mode = ui.output_mode();
    if mode.shows_guidance() {
        if let Some(agent) = step.agent {
            ui.message(&format!("Agent: {}", agent));
        }

        let fixing = fix.and_then(|f| {
            workflow
                .gate_named(&f.gate)
                .filter(|(_, gate)| gate.work_step == id)
                .map(|(_, gate)| (gate, f.iteration))
        });
        if let Some((gate, iteration)) = fixing {
            let lines = fix_mode_actions(gate, iteration);
            if let Some((banner, rest)) = lines.split_first() {
                ui.warning(&format!("{} (iteration {})", banner, iteration));
                for line in rest {
                    ui.message(&format!("  - {}", line));
                }
            }
        }

        if let Some(guidance) = guidance_for(id) {
            for action in guidance.actions {
                ui.message(&format!("  - {}", action));
            }
            if let Some(checklist) = guidance.checklist {
                ui.message("Complete this verification before writing the plan:");
                for item in checklist {
                    ui.message(&format!("  [ ] {}", item));
                }
            }
            if mode.shows_details() {
                if let Some(expected) = guidance.expected_output {
                    ui.message(&format!("Expected output: {}", expected));
                }
            }
        }
    }

    ui.show_hint(&complete_command(workflow, id));
}

/// Print a gate escalation and how to resolve it.
pub fn show_decision(ui: &mut dyn UserInterface, prompt: &DecisionPrompt) {
    ui.warning(&format!(
        "{}: {} (confidence {}, threshold {}, iteration {})",
        prompt.gate,
        prompt.reason,
        format_confidence(prompt.confidence),
        format_confidence(prompt.threshold),
        iteration_label(prompt.iteration, prompt.max_iterations),
    ));

    if ui.output_mode().shows_guidance() {
        for choice in &prompt.choices {
            ui.message(&format!("  {:<10} {}", choice.as_str(), choice.describe()));
        }
    }

    let choices = prompt
        .choices
        .iter()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join("|");
    ui.show_hint(&format!("planner decide --choice <{}>", choices));
}

/// Print the outcome of a transition and the next thing to do.
pub fn show_transition(ui: &mut dyn UserInterface, workflow: &Workflow, transition: &Transition) {
    let fix = transition.context.fix.as_ref();

    match &transition.action {
        NextAction::Proceed { step } => show_step(ui, workflow, *step, fix),
        NextAction::Retry {
            step,
            gate,
            iteration,
        } => {
            ui.warning(&format!(
                "{} failed; returning to step {} (iteration {})",
                gate, step, iteration
            ));
            show_step(ui, workflow, *step, fix);
        }
        NextAction::Regenerate { step, feedback } => {
            ui.warning(&format!("Regenerating the plan from step {}", step));
            if let Some(feedback) = feedback {
                ui.message(&format!("Feedback: {}", feedback));
            }
            show_step(ui, workflow, *step, fix);
        }
        NextAction::Pause { resume_at } => {
            ui.success("Paused for plan edits");
            ui.message("Edit the plan file, then resume at the review checkpoint.");
            ui.show_hint(&complete_command(workflow, *resume_at));
        }
        NextAction::Decide { prompt } => show_decision(ui, prompt),
        NextAction::SaveAndExit { resume_at } => {
            ui.success("Run saved");
            ui.message(&format!("Resume later at step {}.", resume_at));
            ui.show_hint(&complete_command(workflow, *resume_at));
        }
        NextAction::Abort { at } => {
            ui.warning(&format!("Workflow aborted at step {}", at));
            ui.message("Progress is saved; start a new run with 'planner start --force'.");
        }
        NextAction::Complete => {
            let [title, rest @ ..] = PLAN_APPROVED else {
                return;
            };
            ui.success(title);
            for line in rest {
                ui.message(line);
            }
        }
    }
}
