//! Workflow sequencing.
//!
//! - [`confidence`] - The confidence heuristic and threshold validation
//! - [`gate`] - Gate configuration, state and policy evaluation
//! - [`sequencer`] - The step sequencer and run context
//! - [`decision`] - Collecting checkpoint and gate decisions from the user

pub mod confidence;
pub mod decision;
pub mod gate;
pub mod sequencer;

pub use confidence::{compute_confidence, validate_threshold, DEFAULT_CONFIDENCE_THRESHOLD};
pub use decision::{
    parse_checkpoint_decision, parse_gate_choice, prompt_checkpoint, request_gate_decision,
};
pub use gate::{
    evaluate_gate, Decision, DecisionPrompt, EscalationReason, FixTarget, GateChoice, GateConfig,
    GateState, QualityReport,
};
pub use sequencer::{
    CheckpointDecision, FixContext, NextAction, RunContext, RunPhase, StepOutcome, StepResult,
    StepSequencer, Transition,
};
