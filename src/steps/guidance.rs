//! Step guidance shown to the collaborator running each step.

use crate::runner::gate::{FixTarget, GateConfig};

use super::StepId;

/// What to do at a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepGuidance {
    pub actions: &'static [&'static str],
    /// Expected output of a dispatched sub-agent.
    pub expected_output: Option<&'static str>,
    /// Blocking self-audit to complete before the step is reported done.
    pub checklist: Option<&'static [&'static str]>,
}

/// Self-audit completed before the plan is written, in priority order.
pub const PLANNING_VERIFICATION: &[&str] = &[
    "VERIFY 1 (blocking): Decision Log completeness. Every architectural choice and micro-decision has multi-step reasoning, rejected alternatives have concrete reasons, and risks have mitigations anchored to file:line.",
    "VERIFY 2 (blocking): Code Intent presence. Every milestone that creates or modifies source files has a Code Intent section; only documentation milestones may skip it.",
    "VERIFY 3 (blocking): Invisible Knowledge. Rationale, tradeoffs, invariants and assumptions a reader cannot infer from the code are in the Invisible Knowledge section.",
    "VERIFY 4: Code Intent clarity. Exact file paths, WHAT to change, references to Decision Log entries, and no diff blocks.",
    "VERIFY 5: Milestone specification. Specific behaviours, testable acceptance criteria, a Tests section or an explicit skip reason, and uncertainty flags.",
    "VERIFY 6: Documentation milestone. It exists, CLAUDE.md stays a tabular index, and Invisible Knowledge maps to README.md.",
    "VERIFY 7: Comment hygiene. Comments are transcribed verbatim, so write them in timeless present without change history or location references.",
    "VERIFY 8: Assumption audit. The audit, decision classification and file classification tables are written and no assumption is left unresolved.",
];

/// Guidance for a step, or `None` for an unknown step.
pub fn guidance_for(id: StepId) -> Option<StepGuidance> {
    let mut checklist = None;
    let (actions, expected_output): (&'static [&'static str], Option<&'static str>) = match id {
        StepId::Ordinal(1) => (
            &[
                "Read the project conventions before exploring.",
                "Delegate exploration to the Explore sub-agent with the task and the planning decisions its output feeds.",
                "The sub-agent plans its exploration, gathers findings, checks coverage, fills gaps and formats the result.",
            ],
            Some("Structured findings with approach, assumption and milestone inputs"),
        ),
        StepId::Ordinal(2) => (
            &[
                "Discover the existing testing strategy from the conversation, project docs and conventions.",
                "Propose an approach for unit, integration and end-to-end tests and confirm each with the user.",
                "Record the confirmed strategy in the Decision Log as user-specified.",
            ],
            None,
        ),
        StepId::Ordinal(3) => (
            &[
                "Generate 2-3 approaches, including a minimal-change option and an idiomatic option.",
                "Document the advantages and disadvantages of each.",
                "For new technology or migrations, research its canonical usage first.",
            ],
            None,
        ),
        StepId::Ordinal(4) => (
            &[
                "Skip when the task involves no migration, no policy defaults and no contested architecture.",
                "Otherwise audit pattern preservation, migration strategy, idiomatic usage, abstraction boundaries and policy defaults.",
                "Confirm every open assumption with the user and record the answer in the Decision Log.",
            ],
            None,
        ),
        StepId::Ordinal(5) => {
            checklist = Some(PLANNING_VERIFICATION);
            (
                &[
                    "Evaluate the approaches by probability of success, failure mode and backtrack cost.",
                    "Record the selection in the Decision Log with a multi-step reasoning chain.",
                    "Write milestones with exact file paths, specific requirements, testable acceptance criteria, code intent and tests.",
                    "Prefer vertical slices that can run in parallel over horizontal layers.",
                    "Write the plan with code intent only; the developer fills diffs later.",
                ],
                None,
            )
        }
        StepId::Checkpoint => (
            &[
                "The plan is written. Review it before code generation and quality reviews begin.",
                "Check that the approach matches your intent and the milestones are correctly specified.",
                "Approve to continue, Review & Edit to pause, Regenerate to restart approach generation with feedback, or Save & Exit to resume later.",
            ],
            None,
        ),
        StepId::Ordinal(6) => (
            &[
                "Dispatch the quality-reviewer to check the plan for completeness.",
                "Report the review result to the gate.",
            ],
            Some("PASS or ISSUES"),
        ),
        StepId::Ordinal(8) => (
            &[
                "Dispatch the developer to fill in code diffs for every milestone.",
                "The developer edits the plan file in place.",
            ],
            None,
        ),
        StepId::Ordinal(9) => (
            &[
                "Dispatch the quality-reviewer to check the code diffs.",
                "Report the review result to the gate.",
            ],
            Some("PASS or ISSUES"),
        ),
        StepId::Ordinal(11) => (
            &[
                "Dispatch the technical-writer to scrub documentation and comments.",
                "The technical writer edits the plan file in place.",
            ],
            Some("COMPLETE or BLOCKED"),
        ),
        StepId::Ordinal(12) => (
            &[
                "Dispatch the quality-reviewer to check the documentation.",
                "Report the review result to the gate.",
            ],
            Some("PASS or ISSUES"),
        ),
        StepId::Ordinal(7) | StepId::Ordinal(10) | StepId::Ordinal(13) => (
            &[
                "Report the quality-review outcome: --qr-status pass|fail, with --findings when the reviewer counted issues.",
            ],
            None,
        ),
        StepId::Ordinal(_) => return None,
    };

    Some(StepGuidance {
        actions,
        expected_output,
        checklist,
    })
}

/// Shown once the last gate passes or is skipped.
pub const PLAN_APPROVED: &[&str] = &[
    "PLAN APPROVED",
    "All quality reviews finished. The plan is ready for execution.",
    "Hand the plan file to the implementation workflow.",
];

/// Extra instructions for a work step re-run to fix gate failures.
///
/// The first line is the banner. Gates fixed by the orchestrator edit the plan
/// directly; the others re-dispatch their agent in fix mode.
pub fn fix_mode_actions(gate: &GateConfig, iteration: u32) -> Vec<String> {
    match gate.fix_target {
        FixTarget::Orchestrator => vec![
            format!("FIX MODE: {} found plan structure issues.", gate.name),
            "Review the findings in your context and fix them in the plan file directly.".to_string(),
            "Common issues: missing Decision Log entries, incomplete Code Intent, missing Invisible Knowledge, incomplete milestones.".to_string(),
            "Then proceed to the quality review for fresh verification.".to_string(),
        ],
        target => vec![
            format!("FIX MODE: {} found issues.", gate.name),
            format!(
                "Do not edit the plan yourself. Re-dispatch the {} in fix mode with --qr-fail --qr-iteration {}.",
                target.agent(),
                iteration
            ),
            format!("Pass the {} findings to the {} unchanged.", gate.name, target.agent()),
            "Then proceed to the quality review for fresh verification.".to_string(),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::Workflow;

    #[test]
    fn every_workflow_step_has_guidance() {
        for step in Workflow::planner().steps() {
            let guidance = guidance_for(step.id);
            assert!(guidance.is_some(), "missing guidance for step {}", step.id);
            assert!(!guidance.unwrap().actions.is_empty());
        }
    }

    #[test]
    fn unknown_step_has_no_guidance() {
        assert!(guidance_for(StepId::Ordinal(14)).is_none());
    }

    #[test]
    fn review_steps_expect_pass_or_issues() {
        for n in [6, 9, 12] {
            let g = guidance_for(StepId::Ordinal(n)).unwrap();
            assert_eq!(g.expected_output, Some("PASS or ISSUES"));
        }
    }

    fn gate(name: &str) -> GateConfig {
        let workflow = Workflow::planner();
        workflow.gate_named(name).unwrap().1.clone()
    }

    #[test]
    fn completeness_fix_edits_the_plan() {
        let lines = fix_mode_actions(&gate("QR-COMPLETENESS"), 2);
        assert!(lines[0].contains("QR-COMPLETENESS"));
        assert!(lines.iter().any(|l| l.contains("plan file directly")));
        assert!(!lines.iter().any(|l| l.contains("Re-dispatch")));
    }

    #[test]
    fn code_fix_redispatches_developer() {
        let lines = fix_mode_actions(&gate("QR-CODE"), 2);
        assert!(lines[0].contains("QR-CODE"));
        assert!(lines
            .iter()
            .any(|l| l.contains("Re-dispatch the developer") && l.contains("--qr-iteration 2")));
        assert!(!lines.iter().any(|l| l.contains("plan file directly")));
    }

    #[test]
    fn docs_fix_redispatches_technical_writer() {
        let lines = fix_mode_actions(&gate("QR-DOCS"), 3);
        assert!(lines
            .iter()
            .any(|l| l.contains("Re-dispatch the technical-writer") && l.contains("--qr-iteration 3")));
        assert!(!lines.iter().any(|l| l.contains("plan file directly")));
    }

    #[test]
    fn milestone_step_carries_verification_checklist() {
        let g = guidance_for(StepId::Ordinal(5)).unwrap();
        let checklist = g.checklist.unwrap();
        assert_eq!(checklist.len(), 8);
        assert!(checklist[0].starts_with("VERIFY 1"));
        assert!(checklist[7].starts_with("VERIFY 8"));
    }

    #[test]
    fn other_steps_have_no_checklist() {
        for n in [1, 2, 3, 4, 6, 8] {
            assert!(guidance_for(StepId::Ordinal(n)).unwrap().checklist.is_none());
        }
    }
}
