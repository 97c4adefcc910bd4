//! Quality gates.
//!
//! A gate step advances only when the quality review feeding it passes.
//! [`evaluate_gate`] applies the gate policy to the latest review result:
//!
//! 1. Confidence below the run's threshold escalates to the user.
//! 2. A failing review at the iteration limit escalates to the user.
//! 3. Any other failing review is retried automatically.
//! 4. A passing review advances.
//!
//! The order is fixed: the confidence check is the stricter one and is never
//! bypassed by iteration bookkeeping.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::steps::StepId;

use super::confidence::compute_confidence;

/// Who repairs the artifact when a gate fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FixTarget {
    /// The orchestrating agent fixes the plan itself.
    Orchestrator,
    /// The developer agent reworks the code diffs.
    Developer,
    /// The technical writer reworks the documentation.
    TechnicalWriter,
}

impl FixTarget {
    /// Agent name as shown to the user.
    pub fn agent(&self) -> &'static str {
        match self {
            Self::Orchestrator => "orchestrator",
            Self::Developer => "developer",
            Self::TechnicalWriter => "technical-writer",
        }
    }
}

/// Static configuration of a gate.
#[derive(Debug, Clone, PartialEq)]
pub struct GateConfig {
    /// Gate identifier, e.g. `QR-COMPLETENESS`.
    pub name: String,
    /// Failed attempts allowed before the user decides. `None` is unbounded.
    pub max_iterations: Option<u32>,
    /// Quality-review step whose result the gate consumes.
    pub review_step: StepId,
    /// Step that repairs the artifact after a failure.
    pub work_step: StepId,
    /// Step to continue with on pass. `None` ends the workflow.
    pub pass_step: Option<StepId>,
    /// Who performs the repair.
    pub fix_target: FixTarget,
}

/// Result reported by a quality review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityReport {
    /// Whether the review found no issues.
    pub passed: bool,
    /// Number of findings, when the reviewer reports them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub findings_count: Option<u32>,
}

impl QualityReport {
    /// A passing report.
    pub fn pass() -> Self {
        Self {
            passed: true,
            findings_count: None,
        }
    }

    /// A failing report with a known number of findings.
    pub fn fail(findings_count: u32) -> Self {
        Self {
            passed: false,
            findings_count: Some(findings_count),
        }
    }

    /// A failing report from a reviewer that does not count findings.
    pub fn fail_unscored() -> Self {
        Self {
            passed: false,
            findings_count: None,
        }
    }

    /// Confidence score for this report.
    ///
    /// Reviewers are not required to count findings. When the count is
    /// missing the confidence check is treated as satisfied (score 100), so
    /// only the iteration limit governs a failing review.
    pub fn confidence(&self) -> f64 {
        match self.findings_count {
            Some(count) => compute_confidence(self.passed, count),
            None => compute_confidence(true, 0),
        }
    }
}

/// Runtime state of one gate within one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateState {
    /// Attempt number, starting at 1.
    pub iteration: u32,
    /// Most recent quality-review result.
    pub last_result: QualityReport,
}

impl GateState {
    /// State on first entry to a gate.
    pub fn first(result: QualityReport) -> Self {
        Self {
            iteration: 1,
            last_result: result,
        }
    }
}

/// Choices offered when a gate escalates to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateChoice {
    /// Attempt another fix.
    Fix,
    /// Accept the current state and move on.
    Skip,
    /// Restart from approach generation with feedback.
    Regenerate,
    /// Stop the workflow.
    Abort,
}

impl GateChoice {
    /// All choices, in display order.
    pub const ALL: [GateChoice; 4] = [Self::Fix, Self::Skip, Self::Regenerate, Self::Abort];

    /// Machine-readable value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fix => "fix",
            Self::Skip => "skip",
            Self::Regenerate => "regenerate",
            Self::Abort => "abort",
        }
    }

    /// Human-readable description.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Fix => "Try again",
            Self::Skip => "Accept current state, proceed anyway",
            Self::Regenerate => "Provide feedback, restart approach design",
            Self::Abort => "Exit workflow, save progress",
        }
    }
}

impl fmt::Display for GateChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GateChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fix" => Ok(Self::Fix),
            "skip" => Ok(Self::Skip),
            "regenerate" => Ok(Self::Regenerate),
            "abort" => Ok(Self::Abort),
            other => Err(format!("unknown gate choice: {}", other)),
        }
    }
}

/// Why a gate escalated to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscalationReason {
    /// Confidence fell below the threshold.
    LowConfidence,
    /// The failing review hit the iteration limit.
    IterationLimit,
}

impl fmt::Display for EscalationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LowConfidence => f.write_str("confidence below threshold"),
            Self::IterationLimit => f.write_str("iteration limit reached"),
        }
    }
}

/// Payload of a gate escalation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionPrompt {
    /// Gate that escalated.
    pub gate: String,
    /// Current attempt number.
    pub iteration: u32,
    /// The gate's iteration limit.
    pub max_iterations: Option<u32>,
    /// Confidence of the latest review.
    pub confidence: f64,
    /// Threshold configured for the run.
    pub threshold: f64,
    /// Which check tripped.
    pub reason: EscalationReason,
    /// Choices the user may pick from.
    pub choices: Vec<GateChoice>,
}

impl DecisionPrompt {
    /// Whether a choice is on offer.
    pub fn offers(&self, choice: GateChoice) -> bool {
        self.choices.contains(&choice)
    }

    /// Offered choices as a comma-separated list.
    pub fn offered_list(&self) -> String {
        self.choices
            .iter()
            .map(GateChoice::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Outcome of evaluating a gate.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// The review passed; move on.
    AutoAdvance,
    /// The review failed but within policy; route back to the work step.
    AutoRetry,
    /// The user has to decide.
    UserDecision(DecisionPrompt),
}

/// Apply the gate policy to the latest review result in `state`.
///
/// Only the [`Decision::AutoRetry`] path mutates `state`, incrementing its
/// iteration.
pub fn evaluate_gate(gate: &GateConfig, state: &mut GateState, threshold: f64) -> Decision {
    let result = state.last_result;
    let confidence = result.confidence();

    let escalate = |reason: EscalationReason, state: &GateState| {
        Decision::UserDecision(DecisionPrompt {
            gate: gate.name.clone(),
            iteration: state.iteration,
            max_iterations: gate.max_iterations,
            confidence,
            threshold,
            reason,
            choices: GateChoice::ALL.to_vec(),
        })
    };

    if confidence < threshold {
        debug!(
            "{}: confidence {:.1} below threshold {:.1}",
            gate.name, confidence, threshold
        );
        return escalate(EscalationReason::LowConfidence, state);
    }

    if !result.passed {
        if let Some(max) = gate.max_iterations {
            if state.iteration >= max {
                debug!(
                    "{}: iteration {}/{} reached, escalating",
                    gate.name, state.iteration, max
                );
                return escalate(EscalationReason::IterationLimit, state);
            }
        }

        state.iteration += 1;
        debug!("{}: retrying, iteration now {}", gate.name, state.iteration);
        return Decision::AutoRetry;
    }

    Decision::AutoAdvance
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate(max_iterations: Option<u32>) -> GateConfig {
        GateConfig {
            name: "QR-CODE".to_string(),
            max_iterations,
            review_step: StepId::Ordinal(9),
            work_step: StepId::Ordinal(8),
            pass_step: Some(StepId::Ordinal(11)),
            fix_target: FixTarget::Developer,
        }
    }

    fn state(iteration: u32, last_result: QualityReport) -> GateState {
        GateState {
            iteration,
            last_result,
        }
    }

    #[test]
    fn pass_auto_advances() {
        let mut s = state(1, QualityReport::pass());
        assert_eq!(evaluate_gate(&gate(Some(3)), &mut s, 80.0), Decision::AutoAdvance);
        assert_eq!(s.iteration, 1);
    }

    #[test]
    fn pass_auto_advances_past_iteration_limit() {
        let mut s = state(5, QualityReport::pass());
        assert_eq!(evaluate_gate(&gate(Some(3)), &mut s, 80.0), Decision::AutoAdvance);
    }

    #[test]
    fn pass_auto_advances_at_maximum_threshold() {
        let mut s = state(1, QualityReport::pass());
        assert_eq!(evaluate_gate(&gate(Some(3)), &mut s, 100.0), Decision::AutoAdvance);
    }

    #[test]
    fn confident_failure_retries_and_increments() {
        let mut s = state(1, QualityReport::fail(3));
        assert_eq!(evaluate_gate(&gate(Some(3)), &mut s, 80.0), Decision::AutoRetry);
        assert_eq!(s.iteration, 2);
    }

    #[test]
    fn low_confidence_escalates_without_mutation() {
        let mut s = state(1, QualityReport::fail(8));
        let decision = evaluate_gate(&gate(Some(3)), &mut s, 80.0);
        match decision {
            Decision::UserDecision(prompt) => {
                assert_eq!(prompt.reason, EscalationReason::LowConfidence);
                assert_eq!(prompt.confidence, 60.0);
                assert_eq!(prompt.threshold, 80.0);
                assert_eq!(prompt.iteration, 1);
            }
            other => panic!("expected UserDecision, got {:?}", other),
        }
        assert_eq!(s.iteration, 1);
    }

    #[test]
    fn low_confidence_takes_precedence_over_iteration_limit() {
        let mut s = state(3, QualityReport::fail(10));
        match evaluate_gate(&gate(Some(3)), &mut s, 80.0) {
            Decision::UserDecision(prompt) => {
                assert_eq!(prompt.reason, EscalationReason::LowConfidence)
            }
            other => panic!("expected UserDecision, got {:?}", other),
        }
    }

    #[test]
    fn retry_at_limit_minus_one_then_escalates() {
        let g = gate(Some(3));
        let mut s = state(2, QualityReport::fail(2));

        assert_eq!(evaluate_gate(&g, &mut s, 80.0), Decision::AutoRetry);
        assert_eq!(s.iteration, 3);

        match evaluate_gate(&g, &mut s, 80.0) {
            Decision::UserDecision(prompt) => {
                assert_eq!(prompt.reason, EscalationReason::IterationLimit);
                assert_eq!(prompt.iteration, 3);
                assert_eq!(prompt.max_iterations, Some(3));
            }
            other => panic!("expected UserDecision, got {:?}", other),
        }
        assert_eq!(s.iteration, 3);
    }

    #[test]
    fn unbounded_gate_keeps_retrying() {
        let g = gate(None);
        let mut s = state(1, QualityReport::fail(1));
        for expected in 2..=50 {
            assert_eq!(evaluate_gate(&g, &mut s, 80.0), Decision::AutoRetry);
            assert_eq!(s.iteration, expected);
        }
    }

    #[test]
    fn unscored_failure_has_full_confidence() {
        let report = QualityReport::fail_unscored();
        assert_eq!(report.confidence(), 100.0);

        let mut s = state(1, report);
        assert_eq!(evaluate_gate(&gate(Some(2)), &mut s, 100.0), Decision::AutoRetry);
    }

    #[test]
    fn unscored_failure_still_hits_iteration_limit() {
        let mut s = state(2, QualityReport::fail_unscored());
        match evaluate_gate(&gate(Some(2)), &mut s, 80.0) {
            Decision::UserDecision(prompt) => {
                assert_eq!(prompt.reason, EscalationReason::IterationLimit);
                assert_eq!(prompt.confidence, 100.0);
            }
            other => panic!("expected UserDecision, got {:?}", other),
        }
    }

    #[test]
    fn zero_threshold_never_trips_confidence() {
        let mut s = state(1, QualityReport::fail(40));
        assert_eq!(evaluate_gate(&gate(Some(3)), &mut s, 0.0), Decision::AutoRetry);
    }

    #[test]
    fn escalation_offers_all_four_choices() {
        let mut s = state(3, QualityReport::fail(1));
        let Decision::UserDecision(prompt) = evaluate_gate(&gate(Some(3)), &mut s, 80.0) else {
            panic!("expected UserDecision");
        };
        assert_eq!(
            prompt.choices,
            vec![
                GateChoice::Fix,
                GateChoice::Skip,
                GateChoice::Regenerate,
                GateChoice::Abort
            ]
        );
        assert!(prompt.offers(GateChoice::Abort));
        assert_eq!(prompt.offered_list(), "fix, skip, regenerate, abort");
    }

    #[test]
    fn gate_choice_parses_case_insensitively() {
        assert_eq!("Fix".parse::<GateChoice>().unwrap(), GateChoice::Fix);
        assert_eq!(" ABORT ".parse::<GateChoice>().unwrap(), GateChoice::Abort);
        assert!("retry".parse::<GateChoice>().is_err());
    }
}
