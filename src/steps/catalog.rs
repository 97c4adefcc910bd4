//! The fixed planning workflow.
//!
//! Steps 1-5 produce the plan, the review checkpoint lets the user approve it,
//! and steps 6-13 run three quality-review/gate pairs over the plan, the code
//! diffs and the documentation.

use std::collections::BTreeMap;

use crate::error::{PlannerError, Result};
use crate::runner::gate::{FixTarget, GateConfig};

use super::{StepId, StepKind};

/// A step of the workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowStep {
    pub id: StepId,
    pub kind: StepKind,
    pub title: &'static str,
    /// Sub-agent the step is dispatched to, if any.
    pub agent: Option<&'static str>,
}

const fn step(
    id: StepId,
    kind: StepKind,
    title: &'static str,
    agent: Option<&'static str>,
) -> WorkflowStep {
    WorkflowStep {
        id,
        kind,
        title,
        agent,
    }
}

use StepId::{Checkpoint, Ordinal};
use StepKind::{Gate, Ordinary};

static PLAN_STEPS: [WorkflowStep; 14] = [
    step(Ordinal(1), Ordinary, "Context Discovery", Some("Explore")),
    step(Ordinal(2), Ordinary, "Testing Strategy Discovery", None),
    step(Ordinal(3), Ordinary, "Approach Generation", None),
    step(Ordinal(4), Ordinary, "Assumption Surfacing", None),
    step(Ordinal(5), Ordinary, "Approach Selection & Milestones", None),
    step(Checkpoint, StepKind::Checkpoint, "Plan Review Checkpoint", None),
    step(Ordinal(6), Ordinary, "QR-Completeness", Some("quality-reviewer")),
    step(Ordinal(7), Gate, "QR-Completeness Gate", None),
    step(Ordinal(8), Ordinary, "Developer Fills Diffs", Some("developer")),
    step(Ordinal(9), Ordinary, "QR-Code", Some("quality-reviewer")),
    step(Ordinal(10), Gate, "QR-Code Gate", None),
    step(Ordinal(11), Ordinary, "TW Documentation Scrub", Some("technical-writer")),
    step(Ordinal(12), Ordinary, "QR-Docs", Some("quality-reviewer")),
    step(Ordinal(13), Gate, "QR-Docs Gate", None),
];

/// Step the workflow returns to when the user asks to regenerate the plan.
pub const REGENERATE_STEP: StepId = Ordinal(3);

/// Step the checkpoint approves into.
pub const APPROVE_STEP: StepId = Ordinal(6);

/// Names of the built-in gates.
pub const GATE_NAMES: [&str; 3] = ["QR-COMPLETENESS", "QR-CODE", "QR-DOCS"];

/// The workflow definition: ordered steps plus the gate table.
#[derive(Debug, Clone, PartialEq)]
pub struct Workflow {
    steps: &'static [WorkflowStep],
    gates: BTreeMap<StepId, GateConfig>,
}

impl Default for Workflow {
    fn default() -> Self {
        Self::planner()
    }
}

impl Workflow {
    /// The planning workflow with its default gate limits.
    pub fn planner() -> Self {
        let gates = [
            (
                Ordinal(7),
                GateConfig {
                    name: GATE_NAMES[0].to_string(),
                    max_iterations: Some(3),
                    review_step: Ordinal(6),
                    work_step: Ordinal(5),
                    pass_step: Some(Ordinal(8)),
                    fix_target: FixTarget::Orchestrator,
                },
            ),
            (
                Ordinal(10),
                GateConfig {
                    name: GATE_NAMES[1].to_string(),
                    max_iterations: Some(3),
                    review_step: Ordinal(9),
                    work_step: Ordinal(8),
                    pass_step: Some(Ordinal(11)),
                    fix_target: FixTarget::Developer,
                },
            ),
            (
                Ordinal(13),
                GateConfig {
                    name: GATE_NAMES[2].to_string(),
                    // docs usually converge faster
                    max_iterations: Some(2),
                    review_step: Ordinal(12),
                    work_step: Ordinal(11),
                    pass_step: None,
                    fix_target: FixTarget::TechnicalWriter,
                },
            ),
        ];

        Self {
            steps: &PLAN_STEPS,
            gates: gates.into_iter().collect(),
        }
    }

    /// Override the iteration limit of a gate by name.
    ///
    /// `None` makes the gate unbounded. A limit of zero is rejected.
    pub fn set_max_iterations(&mut self, gate: &str, max_iterations: Option<u32>) -> Result<()> {
        if max_iterations == Some(0) {
            return Err(PlannerError::ConfigValidationError {
                message: format!("gate '{}': max_iterations must be at least 1", gate),
            });
        }

        let config = self
            .gates
            .values_mut()
            .find(|g| g.name.eq_ignore_ascii_case(gate))
            .ok_or_else(|| PlannerError::ConfigValidationError {
                message: format!(
                    "unknown gate '{}' (known gates: {})",
                    gate,
                    GATE_NAMES.join(", ")
                ),
            })?;
        config.max_iterations = max_iterations;
        Ok(())
    }

    /// All steps in execution order.
    pub fn steps(&self) -> &[WorkflowStep] {
        self.steps
    }

    /// First step of the workflow.
    pub fn first(&self) -> StepId {
        self.steps[0].id
    }

    /// Look up a step.
    pub fn step(&self, id: StepId) -> Option<&WorkflowStep> {
        self.steps.iter().find(|s| s.id == id)
    }

    /// Position of a step in the sequence (0-based).
    pub fn position(&self, id: StepId) -> Option<usize> {
        self.steps.iter().position(|s| s.id == id)
    }

    /// The step following `id` in the fixed sequence.
    pub fn next_after(&self, id: StepId) -> Option<StepId> {
        let pos = self.position(id)?;
        self.steps.get(pos + 1).map(|s| s.id)
    }

    /// Gate configuration for a gate step.
    pub fn gate_at(&self, id: StepId) -> Option<&GateConfig> {
        self.gates.get(&id)
    }

    /// Gate configuration by gate name.
    pub fn gate_named(&self, name: &str) -> Option<(StepId, &GateConfig)> {
        self.gates
            .iter()
            .find(|(_, g)| g.name == name)
            .map(|(id, g)| (*id, g))
    }

    /// All gates with their step ids, in step order.
    pub fn gates(&self) -> impl Iterator<Item = (StepId, &GateConfig)> {
        self.gates.iter().map(|(id, g)| (*id, g))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_places_checkpoint_after_step_five() {
        let wf = Workflow::planner();
        assert_eq!(wf.next_after(Ordinal(5)), Some(Checkpoint));
        assert_eq!(wf.next_after(Checkpoint), Some(Ordinal(6)));
    }

    #[test]
    fn sequence_starts_at_one_and_ends_at_thirteen() {
        let wf = Workflow::planner();
        assert_eq!(wf.first(), Ordinal(1));
        assert_eq!(wf.steps().len(), 14);
        assert_eq!(wf.next_after(Ordinal(13)), None);
    }

    #[test]
    fn every_gate_step_has_a_gate_config() {
        let wf = Workflow::planner();
        for s in wf.steps() {
            assert_eq!(
                s.kind == StepKind::Gate,
                wf.gate_at(s.id).is_some(),
                "step {}",
                s.id
            );
        }
    }

    #[test]
    fn gates_review_the_step_before_them() {
        let wf = Workflow::planner();
        for (id, gate) in wf.gates() {
            assert_eq!(wf.next_after(gate.review_step), Some(id));
        }
    }

    #[test]
    fn default_gate_limits() {
        let wf = Workflow::planner();
        assert_eq!(wf.gate_at(Ordinal(7)).unwrap().max_iterations, Some(3));
        assert_eq!(wf.gate_at(Ordinal(10)).unwrap().max_iterations, Some(3));
        assert_eq!(wf.gate_at(Ordinal(13)).unwrap().max_iterations, Some(2));
        assert_eq!(wf.gate_at(Ordinal(13)).unwrap().pass_step, None);
    }

    #[test]
    fn set_max_iterations_overrides_by_name() {
        let mut wf = Workflow::planner();
        wf.set_max_iterations("qr-docs", Some(5)).unwrap();
        wf.set_max_iterations("QR-CODE", None).unwrap();
        assert_eq!(wf.gate_at(Ordinal(13)).unwrap().max_iterations, Some(5));
        assert_eq!(wf.gate_at(Ordinal(10)).unwrap().max_iterations, None);
    }

    #[test]
    fn set_max_iterations_rejects_zero_and_unknown_gates() {
        let mut wf = Workflow::planner();
        assert!(wf.set_max_iterations("QR-CODE", Some(0)).is_err());
        assert!(wf.set_max_iterations("QR-STYLE", Some(2)).is_err());
    }

    #[test]
    fn gate_named_finds_step() {
        let wf = Workflow::planner();
        let (id, gate) = wf.gate_named("QR-CODE").unwrap();
        assert_eq!(id, Ordinal(10));
        assert_eq!(gate.work_step, Ordinal(8));
    }
}
