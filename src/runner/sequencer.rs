//! Step sequencing.
//!
//! [`StepSequencer`] turns the result of the current step into the next
//! action. It never mutates the context it is given: every transition
//! returns a fresh [`RunContext`], so a rejected result leaves the run
//! exactly as it was and a persisted context resumes with identical
//! semantics.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{PlannerError, Result};
use crate::steps::{StepId, StepKind, Workflow, APPROVE_STEP, REGENERATE_STEP};

use super::confidence::{validate_threshold, DEFAULT_CONFIDENCE_THRESHOLD};
use super::gate::{evaluate_gate, Decision, DecisionPrompt, GateChoice, GateState, QualityReport};

/// Where a run stands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunPhase {
    /// Waiting for the result of `current_step`.
    Running,
    /// A gate escalated; waiting for the user's choice.
    AwaitingDecision { prompt: DecisionPrompt },
    /// The final gate passed or was skipped.
    Completed,
    /// The user aborted at a gate.
    Aborted,
}

/// An active fix loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixContext {
    /// Gate whose failure is being fixed.
    pub gate: String,
    /// Gate iteration the fix belongs to.
    pub iteration: u32,
}

/// State of one planning run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunContext {
    pub current_step: StepId,
    pub confidence_threshold: f64,
    #[serde(default)]
    pub gate_states: BTreeMap<String, GateState>,
    pub phase: RunPhase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix: Option<FixContext>,
    /// User feedback carried into plan regeneration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

impl RunContext {
    /// Whether the run can still make progress.
    pub fn is_finished(&self) -> bool {
        matches!(self.phase, RunPhase::Completed | RunPhase::Aborted)
    }

    /// The pending gate decision, if any.
    pub fn pending_decision(&self) -> Option<&DecisionPrompt> {
        match &self.phase {
            RunPhase::AwaitingDecision { prompt } => Some(prompt),
            _ => None,
        }
    }
}

/// Decision taken at the plan review checkpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum CheckpointDecision {
    /// Proceed to the quality reviews.
    Approve,
    /// Pause so the plan can be edited, then resume at the checkpoint.
    ReviewEdit,
    /// Restart approach generation with feedback.
    Regenerate { feedback: Option<String> },
    /// Stop here and resume in a later session.
    SaveExit,
}

/// What a step produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// An ordinary step finished.
    Done,
    /// The checkpoint was resolved.
    Checkpoint(CheckpointDecision),
    /// A quality review finished. `findings_count` is signed so negative
    /// counts from collaborators can be rejected explicitly.
    Quality {
        passed: bool,
        findings_count: Option<i64>,
    },
}

/// Result of a step reported by the collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepResult {
    pub step: StepId,
    pub outcome: StepOutcome,
}

impl StepResult {
    /// An ordinary step finished.
    pub fn done(step: StepId) -> Self {
        Self {
            step,
            outcome: StepOutcome::Done,
        }
    }

    /// The checkpoint was resolved.
    pub fn checkpoint(decision: CheckpointDecision) -> Self {
        Self {
            step: StepId::Checkpoint,
            outcome: StepOutcome::Checkpoint(decision),
        }
    }

    /// A gate received a quality-review result.
    pub fn quality(step: StepId, passed: bool, findings_count: Option<i64>) -> Self {
        Self {
            step,
            outcome: StepOutcome::Quality {
                passed,
                findings_count,
            },
        }
    }
}

/// What the collaborator should do next.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum NextAction {
    /// Run a step.
    Proceed { step: StepId },
    /// Re-run a work step to fix gate findings.
    Retry {
        step: StepId,
        gate: String,
        iteration: u32,
    },
    /// Restart approach generation with the user's feedback.
    Regenerate {
        step: StepId,
        feedback: Option<String>,
    },
    /// Pause for edits; resume at the given step.
    Pause { resume_at: StepId },
    /// Ask the user to resolve a gate escalation.
    Decide { prompt: DecisionPrompt },
    /// Persist the run and exit; resume at the given step.
    SaveAndExit { resume_at: StepId },
    /// The user aborted the run.
    Abort { at: StepId },
    /// The plan is approved.
    Complete,
}

/// A new context together with the action it implies.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub context: RunContext,
    pub action: NextAction,
}

/// Drives a run through the workflow.
#[derive(Debug, Clone, Default)]
pub struct StepSequencer {
    workflow: Workflow,
}

impl StepSequencer {
    /// Create a sequencer for a workflow.
    pub fn new(workflow: Workflow) -> Self {
        Self { workflow }
    }

    /// The workflow being driven.
    pub fn workflow(&self) -> &Workflow {
        &self.workflow
    }

    /// Start a run at the first step.
    ///
    /// An invalid threshold is rejected before any step exists.
    pub fn start(&self, confidence_threshold: f64) -> Result<RunContext> {
        let confidence_threshold = validate_threshold(confidence_threshold)?;
        let first = self.workflow.first();
        info!(
            "Starting planning run at step {} (confidence threshold {})",
            first, confidence_threshold
        );

        Ok(RunContext {
            current_step: first,
            confidence_threshold,
            gate_states: BTreeMap::new(),
            phase: RunPhase::Running,
            fix: None,
            feedback: None,
        })
    }

    /// Start a run with the default threshold.
    pub fn start_default(&self) -> Result<RunContext> {
        self.start(DEFAULT_CONFIDENCE_THRESHOLD)
    }

    /// Apply the result of the current step.
    pub fn advance(&self, ctx: &RunContext, result: &StepResult) -> Result<Transition> {
        validate_threshold(ctx.confidence_threshold)?;
        self.expect_current(ctx, result.step)?;

        let step = self.workflow.step(result.step).ok_or_else(|| {
            PlannerError::InvalidStepTransition {
                received: result.step,
                expected: "a step of the planning workflow".to_string(),
            }
        })?;

        debug!("Advancing from step {} ({:?})", step.id, step.kind);

        match (step.kind, &result.outcome) {
            (StepKind::Ordinary, StepOutcome::Done) => Ok(self.after_ordinary(ctx, step.id)),
            (StepKind::Checkpoint, StepOutcome::Checkpoint(decision)) => {
                Ok(self.after_checkpoint(ctx, decision))
            }
            (
                StepKind::Gate,
                StepOutcome::Quality {
                    passed,
                    findings_count,
                },
            ) => self.after_gate(ctx, step.id, *passed, *findings_count),
            (kind, _) => Err(PlannerError::UnexpectedOutcome {
                step: step.id,
                expected: match kind {
                    StepKind::Ordinary => "a plain completion".to_string(),
                    StepKind::Checkpoint => {
                        "a checkpoint decision (approve, review-edit, regenerate, save-exit)"
                            .to_string()
                    }
                    StepKind::Gate => "a quality-review result (pass or fail)".to_string(),
                },
            }),
        }
    }

    /// Resolve a pending gate escalation with the user's choice.
    pub fn resolve_decision(
        &self,
        ctx: &RunContext,
        choice: GateChoice,
        feedback: Option<&str>,
    ) -> Result<Transition> {
        let prompt = ctx
            .pending_decision()
            .ok_or(PlannerError::NoPendingDecision {
                step: ctx.current_step,
            })?;

        if !prompt.offers(choice) {
            return Err(PlannerError::UnresolvedUserDecision {
                gate: prompt.gate.clone(),
                choice: choice.to_string(),
                offered: prompt.offered_list(),
            });
        }

        let (gate_step, gate) = self.workflow.gate_named(&prompt.gate).ok_or_else(|| {
            PlannerError::GateNotFound {
                reference: format!("'{}'", prompt.gate),
            }
        })?;

        info!("{}: user chose {}", gate.name, choice);

        let mut next = ctx.clone();
        next.phase = RunPhase::Running;

        let action = match choice {
            GateChoice::Fix => {
                let state = next
                    .gate_states
                    .entry(gate.name.clone())
                    .or_insert_with(|| GateState::first(QualityReport::fail_unscored()));
                state.iteration += 1;
                let iteration = state.iteration;
                next.current_step = gate.work_step;
                next.fix = Some(FixContext {
                    gate: gate.name.clone(),
                    iteration,
                });
                NextAction::Retry {
                    step: gate.work_step,
                    gate: gate.name.clone(),
                    iteration,
                }
            }
            GateChoice::Skip => {
                next.fix = None;
                match gate.pass_step {
                    Some(step) => {
                        next.current_step = step;
                        NextAction::Proceed { step }
                    }
                    None => {
                        next.phase = RunPhase::Completed;
                        NextAction::Complete
                    }
                }
            }
            GateChoice::Regenerate => regenerate(&mut next, feedback.map(str::to_string)),
            GateChoice::Abort => {
                next.phase = RunPhase::Aborted;
                next.fix = None;
                NextAction::Abort { at: gate_step }
            }
        };

        Ok(Transition {
            context: next,
            action,
        })
    }

    /// Reject results that are not for the step the run waits on.
    fn expect_current(&self, ctx: &RunContext, received: StepId) -> Result<()> {
        let expected = match &ctx.phase {
            RunPhase::Running if ctx.current_step == received => return Ok(()),
            RunPhase::Running => format!("a result for step {}", ctx.current_step),
            RunPhase::AwaitingDecision { prompt } => {
                format!("a decision for gate {}", prompt.gate)
            }
            RunPhase::Completed => "nothing (the run is complete)".to_string(),
            RunPhase::Aborted => "nothing (the run was aborted)".to_string(),
        };
        Err(PlannerError::InvalidStepTransition { received, expected })
    }

    fn after_ordinary(&self, ctx: &RunContext, step: StepId) -> Transition {
        let mut next = ctx.clone();

        // A work step finishing a fix goes straight back to its review.
        let fix_review = ctx.fix.as_ref().and_then(|fix| {
            self.workflow
                .gate_named(&fix.gate)
                .filter(|(_, gate)| gate.work_step == step)
                .map(|(_, gate)| gate.review_step)
        });

        let action = match fix_review.or_else(|| self.workflow.next_after(step)) {
            Some(following) => {
                next.current_step = following;
                NextAction::Proceed { step: following }
            }
            None => {
                next.phase = RunPhase::Completed;
                NextAction::Complete
            }
        };

        Transition {
            context: next,
            action,
        }
    }

    fn after_checkpoint(&self, ctx: &RunContext, decision: &CheckpointDecision) -> Transition {
        let mut next = ctx.clone();
        info!("Plan review checkpoint: {:?}", decision);

        let action = match decision {
            CheckpointDecision::Approve => {
                next.current_step = APPROVE_STEP;
                NextAction::Proceed { step: APPROVE_STEP }
            }
            CheckpointDecision::ReviewEdit => NextAction::Pause {
                resume_at: StepId::Checkpoint,
            },
            CheckpointDecision::Regenerate { feedback } => regenerate(&mut next, feedback.clone()),
            CheckpointDecision::SaveExit => NextAction::SaveAndExit {
                resume_at: StepId::Checkpoint,
            },
        };

        Transition {
            context: next,
            action,
        }
    }

    fn after_gate(
        &self,
        ctx: &RunContext,
        step: StepId,
        passed: bool,
        findings_count: Option<i64>,
    ) -> Result<Transition> {
        let findings_count = findings_count
            .map(|count| u32::try_from(count).map_err(|_| PlannerError::InvalidFindingsCount { count }))
            .transpose()?;

        let gate = self.workflow.gate_at(step).ok_or_else(|| {
            PlannerError::GateNotFound {
                reference: format!("step {}", step),
            }
        })?;

        if passed && findings_count.is_some_and(|n| n > 0) {
            debug!(
                "{}: passing review reported {:?} findings; ignoring them",
                gate.name, findings_count
            );
        }

        let report = QualityReport {
            passed,
            findings_count,
        };

        let mut next = ctx.clone();
        let state = next
            .gate_states
            .entry(gate.name.clone())
            .and_modify(|s| s.last_result = report)
            .or_insert_with(|| GateState::first(report));

        let decision = evaluate_gate(gate, state, ctx.confidence_threshold);
        let iteration = state.iteration;

        let action = match decision {
            Decision::AutoAdvance => {
                next.fix = None;
                match gate.pass_step {
                    Some(pass) => {
                        next.current_step = pass;
                        NextAction::Proceed { step: pass }
                    }
                    None => {
                        info!("{} passed: plan approved", gate.name);
                        next.phase = RunPhase::Completed;
                        NextAction::Complete
                    }
                }
            }
            Decision::AutoRetry => {
                next.current_step = gate.work_step;
                next.fix = Some(FixContext {
                    gate: gate.name.clone(),
                    iteration,
                });
                NextAction::Retry {
                    step: gate.work_step,
                    gate: gate.name.clone(),
                    iteration,
                }
            }
            Decision::UserDecision(prompt) => {
                info!("{} escalated: {}", gate.name, prompt.reason);
                next.phase = RunPhase::AwaitingDecision {
                    prompt: prompt.clone(),
                };
                NextAction::Decide { prompt }
            }
        };

        Ok(Transition {
            context: next,
            action,
        })
    }
}

/// Send the run back to approach generation.
///
/// Gate history belongs to the discarded plan, so it is cleared.
fn regenerate(next: &mut RunContext, feedback: Option<String>) -> NextAction {
    next.current_step = REGENERATE_STEP;
    next.gate_states.clear();
    next.fix = None;
    next.feedback = feedback.clone();
    NextAction::Regenerate {
        step: REGENERATE_STEP,
        feedback,
    }
}
