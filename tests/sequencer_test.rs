//! End-to-end sequencing through the public API.

use planner::config::PlannerConfig;
use planner::runner::{
    compute_confidence, CheckpointDecision, EscalationReason, GateChoice, NextAction, RunContext,
    StepResult, StepSequencer,
};
use planner::state::RunStore;
use planner::steps::StepId;
use planner::PlannerError;
use tempfile::TempDir;

fn step(n: u8) -> StepId {
    StepId::Ordinal(n)
}

/// Drive a fresh run through steps 1-6 to the first gate.
fn at_first_gate(sequencer: &StepSequencer, threshold: f64) -> RunContext {
    let mut ctx = sequencer.start(threshold).unwrap();
    for n in 1..=5 {
        ctx = sequencer.advance(&ctx, &StepResult::done(step(n))).unwrap().context;
    }
    ctx = sequencer
        .advance(&ctx, &StepResult::checkpoint(CheckpointDecision::Approve))
        .unwrap()
        .context;
    ctx = sequencer.advance(&ctx, &StepResult::done(step(6))).unwrap().context;
    assert_eq!(ctx.current_step, step(7));
    ctx
}

/// Fail the first gate, then redo the fix loop back to it.
fn fail_and_return(
    sequencer: &StepSequencer,
    ctx: &RunContext,
    findings: i64,
) -> (NextAction, RunContext) {
    let t = sequencer
        .advance(ctx, &StepResult::quality(step(7), false, Some(findings)))
        .unwrap();
    let action = t.action.clone();
    if !matches!(action, NextAction::Retry { .. }) {
        return (action, t.context);
    }
    let ctx = sequencer.advance(&t.context, &StepResult::done(step(5))).unwrap().context;
    let ctx = sequencer.advance(&ctx, &StepResult::done(step(6))).unwrap().context;
    (action, ctx)
}

#[test]
fn confidence_examples() {
    assert_eq!(compute_confidence(true, 0), 100.0);
    assert_eq!(compute_confidence(false, 2), 90.0);
    assert_eq!(compute_confidence(false, 8), 60.0);
    assert_eq!(compute_confidence(false, 25), 0.0);
}

#[test]
fn retries_until_iteration_limit() {
    let sequencer = StepSequencer::default();
    let ctx = at_first_gate(&sequencer, 80.0);

    let (action, ctx) = fail_and_return(&sequencer, &ctx, 3);
    assert_eq!(
        action,
        NextAction::Retry {
            step: step(5),
            gate: "QR-COMPLETENESS".to_string(),
            iteration: 2,
        }
    );

    let (action, ctx) = fail_and_return(&sequencer, &ctx, 1);
    assert!(matches!(action, NextAction::Retry { iteration: 3, .. }));

    let (action, _) = fail_and_return(&sequencer, &ctx, 2);
    match action {
        NextAction::Decide { prompt } => {
            assert_eq!(prompt.reason, EscalationReason::IterationLimit);
            assert_eq!(prompt.iteration, 3);
            assert_eq!(prompt.confidence, 90.0);
        }
        other => panic!("expected a decision, got {:?}", other),
    }
}

#[test]
fn low_confidence_wins_over_iteration_limit() {
    let sequencer = StepSequencer::default();
    let ctx = at_first_gate(&sequencer, 80.0);
    let (_, ctx) = fail_and_return(&sequencer, &ctx, 1);
    let (_, ctx) = fail_and_return(&sequencer, &ctx, 1);

    // Iteration 3 of 3 with 8 findings: both checks trip.
    let (action, _) = fail_and_return(&sequencer, &ctx, 8);
    match action {
        NextAction::Decide { prompt } => {
            assert_eq!(prompt.reason, EscalationReason::LowConfidence)
        }
        other => panic!("expected a decision, got {:?}", other),
    }
}

#[test]
fn repeated_result_is_rejected_and_state_kept() {
    let sequencer = StepSequencer::default();
    let ctx = at_first_gate(&sequencer, 80.0);
    let result = StepResult::quality(step(7), false, Some(1));

    let first = sequencer.advance(&ctx, &result).unwrap();
    let err = sequencer.advance(&first.context, &result).unwrap_err();

    assert!(matches!(err, PlannerError::InvalidStepTransition { .. }));
}

#[test]
fn omitted_findings_only_hit_iteration_limit() {
    let sequencer = StepSequencer::default();
    let mut ctx = at_first_gate(&sequencer, 99.0);

    for expected in [2, 3] {
        let t = sequencer
            .advance(&ctx, &StepResult::quality(step(7), false, None))
            .unwrap();
        assert!(matches!(t.action, NextAction::Retry { iteration, .. } if iteration == expected));
        ctx = sequencer.advance(&t.context, &StepResult::done(step(5))).unwrap().context;
        ctx = sequencer.advance(&ctx, &StepResult::done(step(6))).unwrap().context;
    }

    let t = sequencer
        .advance(&ctx, &StepResult::quality(step(7), false, None))
        .unwrap();
    assert!(matches!(
        t.action,
        NextAction::Decide { ref prompt } if prompt.reason == EscalationReason::IterationLimit
    ));
}

#[test]
fn threshold_out_of_range_is_rejected() {
    let err = StepSequencer::default().start(150.0).unwrap_err();
    assert!(matches!(err, PlannerError::InvalidThreshold { .. }));
}

#[test]
fn persisted_run_resumes_with_same_action() {
    let temp = TempDir::new().unwrap();
    let store = RunStore::new(temp.path());
    let sequencer = StepSequencer::default();
    let ctx = at_first_gate(&sequencer, 80.0);

    store.save(&ctx).unwrap();
    let restored = store.load().unwrap().context;

    let result = StepResult::quality(step(7), false, Some(2));
    let direct = sequencer.advance(&ctx, &result).unwrap();
    let resumed = sequencer.advance(&restored, &result).unwrap();

    assert_eq!(direct.action, resumed.action);
    assert_eq!(direct.context, resumed.context);
}

#[test]
fn pending_decision_survives_persistence() {
    let temp = TempDir::new().unwrap();
    let store = RunStore::new(temp.path());
    let sequencer = StepSequencer::default();
    let ctx = at_first_gate(&sequencer, 80.0);
    let escalated = sequencer
        .advance(&ctx, &StepResult::quality(step(7), false, Some(10)))
        .unwrap()
        .context;

    store.save(&escalated).unwrap();
    let restored = store.load().unwrap().context;

    let t = sequencer
        .resolve_decision(&restored, GateChoice::Skip, None)
        .unwrap();
    assert_eq!(t.action, NextAction::Proceed { step: step(8) });
}

#[test]
fn configured_limit_changes_escalation_point() {
    let config: PlannerConfig =
        serde_yaml::from_str("gates:\n  QR-COMPLETENESS:\n    max_iterations: 1\n").unwrap();
    let sequencer = StepSequencer::new(config.workflow().unwrap());
    let ctx = at_first_gate(&sequencer, 80.0);

    let t = sequencer
        .advance(&ctx, &StepResult::quality(step(7), false, Some(1)))
        .unwrap();
    assert!(matches!(t.action, NextAction::Decide { .. }));
}
