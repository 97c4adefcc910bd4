//! Status command implementation.
//!
//! The `planner status` command shows where the current run stands.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cli::args::StatusArgs;
use crate::error::{PlannerError, Result};
use crate::runner::{FixContext, QualityReport, RunContext, RunPhase};
use crate::state::RunSnapshot;
use crate::steps::{StepId, Workflow};
use crate::ui::UserInterface;

use super::dispatcher::{missing_run, Command, CommandResult, ProjectContext};
use super::display;

/// The status command implementation.
pub struct StatusCommand {
    project: ProjectContext,
    args: StatusArgs,
}

impl StatusCommand {
    /// Create a new status command.
    pub fn new(project: ProjectContext, args: StatusArgs) -> Self {
        Self { project, args }
    }
}

/// Machine-readable run status.
#[derive(Debug, Serialize)]
pub struct StatusReport<'a> {
    pub current_step: StepId,
    pub title: Option<&'static str>,
    pub position: Option<usize>,
    pub total_steps: usize,
    pub phase: &'a RunPhase,
    pub confidence_threshold: f64,
    pub gates: Vec<GateStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix: Option<&'a FixContext>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<&'a str>,
    pub saved_at: DateTime<Utc>,
    pub next_command: Option<String>,
}

/// One gate's progress.
#[derive(Debug, Serialize)]
pub struct GateStatus {
    pub name: String,
    pub step: StepId,
    pub max_iterations: Option<u32>,
    pub iteration: Option<u32>,
    pub last_result: Option<QualityReport>,
    pub confidence: Option<f64>,
}

impl<'a> StatusReport<'a> {
    /// Summarize a persisted run.
    pub fn new(workflow: &Workflow, snapshot: &'a RunSnapshot) -> Self {
        let ctx = &snapshot.context;
        let gates = workflow
            .gates()
            .map(|(step, gate)| {
                let state = ctx.gate_states.get(&gate.name);
                GateStatus {
                    name: gate.name.clone(),
                    step,
                    max_iterations: gate.max_iterations,
                    iteration: state.map(|s| s.iteration),
                    last_result: state.map(|s| s.last_result),
                    confidence: state.map(|s| s.last_result.confidence()),
                }
            })
            .collect();

        Self {
            current_step: ctx.current_step,
            title: workflow.step(ctx.current_step).map(|s| s.title),
            position: workflow.position(ctx.current_step).map(|p| p + 1),
            total_steps: workflow.steps().len(),
            phase: &ctx.phase,
            confidence_threshold: ctx.confidence_threshold,
            gates,
            fix: ctx.fix.as_ref(),
            feedback: ctx.feedback.as_deref(),
            saved_at: snapshot.saved_at,
            next_command: next_command(workflow, ctx),
        }
    }
}

fn next_command(workflow: &Workflow, ctx: &RunContext) -> Option<String> {
    match &ctx.phase {
        RunPhase::Running => Some(display::complete_command(workflow, ctx.current_step)),
        RunPhase::AwaitingDecision { prompt } => Some(format!(
            "planner decide --choice <{}>",
            prompt
                .choices
                .iter()
                .map(|c| c.as_str())
                .collect::<Vec<_>>()
                .join("|")
        )),
        RunPhase::Completed | RunPhase::Aborted => None,
    }
}

fn phase_label(phase: &RunPhase) -> &'static str {
    match phase {
        RunPhase::Running => "running",
        RunPhase::AwaitingDecision { .. } => "awaiting decision",
        RunPhase::Completed => "completed",
        RunPhase::Aborted => "aborted",
    }
}

fn gate_line(gate: &GateStatus) -> String {
    match (gate.iteration, gate.last_result) {
        (Some(iteration), Some(result)) => {
            let outcome = if result.passed { "pass" } else { "fail" };
            let findings = result
                .findings_count
                .map(|n| format!(", {} findings", n))
                .unwrap_or_default();
            format!(
                "  {} (step {}): iteration {}, last review {}{} (confidence {})",
                gate.name,
                gate.step,
                display::iteration_label(iteration, gate.max_iterations),
                outcome,
                findings,
                display::format_confidence(result.confidence()),
            )
        }
        _ => format!("  {} (step {}): not reached", gate.name, gate.step),
    }
}

impl Command for StatusCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let store = self.project.store();
        if !store.exists() {
            return Ok(missing_run(ui, &store));
        }

        let config = self.project.config()?;
        let workflow = config.workflow()?;
        let snapshot = store.load()?;
        let report = StatusReport::new(&workflow, &snapshot);

        if self.args.json {
            let json = serde_json::to_string_pretty(&report)
                .map_err(|e| PlannerError::Other(e.into()))?;
            ui.message(&json);
            return Ok(CommandResult::success());
        }

        ui.show_header("Planning run");
        let step = match (report.title, report.position) {
            (Some(title), Some(pos)) => format!(
                "{} - {} ({}/{})",
                report.current_step, title, pos, report.total_steps
            ),
            _ => report.current_step.to_string(),
        };
        ui.message(&format!("Step: {}", step));
        ui.message(&format!("Status: {}", phase_label(report.phase)));

        let mode = ui.output_mode();
        if mode.shows_guidance() {
            ui.message(&format!(
                "Confidence threshold: {}",
                display::format_confidence(report.confidence_threshold)
            ));
            ui.message("Gates:");
            for gate in &report.gates {
                ui.message(&gate_line(gate));
            }
            if let Some(fix) = report.fix {
                ui.warning(&format!("Fixing {} (iteration {})", fix.gate, fix.iteration));
            }
            if let Some(feedback) = report.feedback {
                ui.message(&format!("Feedback: {}", feedback));
            }
        }
        if mode.shows_details() {
            ui.message(&format!(
                "Saved: {}",
                report.saved_at.format("%Y-%m-%d %H:%M:%S UTC")
            ));
        }

        match &snapshot.context.phase {
            RunPhase::AwaitingDecision { prompt } => display::show_decision(ui, prompt),
            _ => {
                if let Some(cmd) = &report.next_command {
                    ui.show_hint(cmd);
                }
            }
        }

        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::{StepResult, StepSequencer};
    use crate::state::RunStore;
    use crate::ui::MockUI;
    use tempfile::TempDir;

    fn run_at_gate_retry() -> (TempDir, RunStore) {
        let temp = TempDir::new().unwrap();
        let store = RunStore::new(temp.path());
        let sequencer = StepSequencer::default();
        let mut ctx = sequencer.start_default().unwrap();
        ctx.current_step = StepId::Ordinal(7);
        let transition = sequencer
            .advance(&ctx, &StepResult::quality(StepId::Ordinal(7), false, Some(3)))
            .unwrap();
        store.save(&transition.context).unwrap();
        (temp, store)
    }

    fn status(temp: &TempDir, json: bool, ui: &mut MockUI) -> CommandResult {
        StatusCommand::new(ProjectContext::new(temp.path(), None), StatusArgs { json })
            .execute(ui)
            .unwrap()
    }

    #[test]
    fn status_without_run_exits_2() {
        let temp = TempDir::new().unwrap();
        let mut ui = MockUI::new();

        assert_eq!(status(&temp, false, &mut ui).exit_code, 2);
    }

    #[test]
    fn status_shows_step_and_gates() {
        let (temp, _store) = run_at_gate_retry();
        let mut ui = MockUI::new();

        assert!(status(&temp, false, &mut ui).success);

        assert!(ui.has_message("Step: 5 - Approach Selection & Milestones (5/14)"));
        assert!(ui.has_message("Status: running"));
        assert!(ui.has_message("QR-COMPLETENESS (step 7): iteration 2/3, last review fail, 3 findings (confidence 85%)"));
        assert!(ui.has_message("QR-DOCS (step 13): not reached"));
        assert!(ui.has_warning("Fixing QR-COMPLETENESS"));
        assert!(ui.has_hint("planner complete --step 5"));
    }

    #[test]
    fn status_json_is_parseable() {
        let (temp, _store) = run_at_gate_retry();
        let mut ui = MockUI::new();

        status(&temp, true, &mut ui);

        let json: serde_json::Value = serde_json::from_str(&ui.messages()[0]).unwrap();
        assert_eq!(json["current_step"], "5");
        assert_eq!(json["phase"]["status"], "running");
        assert_eq!(json["confidence_threshold"], 80.0);
        assert_eq!(json["gates"][0]["name"], "QR-COMPLETENESS");
        assert_eq!(json["gates"][0]["iteration"], 2);
        assert_eq!(json["next_command"], "planner complete --step 5");
    }

    #[test]
    fn status_shows_pending_decision() {
        let temp = TempDir::new().unwrap();
        let store = RunStore::new(temp.path());
        let sequencer = StepSequencer::default();
        let mut ctx = sequencer.start_default().unwrap();
        ctx.current_step = StepId::Ordinal(13);
        let transition = sequencer
            .advance(&ctx, &StepResult::quality(StepId::Ordinal(13), false, Some(20)))
            .unwrap();
        store.save(&transition.context).unwrap();
        let mut ui = MockUI::new();

        status(&temp, false, &mut ui);

        assert!(ui.has_message("Status: awaiting decision"));
        assert!(ui.has_warning("confidence below threshold"));
        assert!(ui.has_hint("planner decide"));
    }
}
