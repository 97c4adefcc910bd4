//! Interactive decisions.
//!
//! The checkpoint and escalated gates block on a choice from the user. Answers
//! outside the offered set are reported and asked again; nothing here ever
//! falls back to a default choice.

use tracing::warn;

use crate::error::{PlannerError, Result};
use crate::ui::{Prompt, PromptOption, PromptType, UserInterface};

use super::gate::{DecisionPrompt, GateChoice};
use super::sequencer::CheckpointDecision;

/// Maximum number of times a decision is asked before giving up.
/// Prevents endless loops when the answer source keeps returning garbage
/// (e.g. a scripted MockUI).
pub const MAX_DECISION_ATTEMPTS: u32 = 5;

const CHECKPOINT_NAME: &str = "Plan Review Checkpoint";
const CHECKPOINT_CHOICES: &str = "approve, review-edit, regenerate, save-exit";

/// Parse a checkpoint answer.
///
/// `feedback` is attached when the answer is `regenerate`.
pub fn parse_checkpoint_decision(raw: &str, feedback: Option<&str>) -> Result<CheckpointDecision> {
    match raw.trim().to_lowercase().replace('_', "-").as_str() {
        "approve" => Ok(CheckpointDecision::Approve),
        "review-edit" | "review" | "edit" => Ok(CheckpointDecision::ReviewEdit),
        "regenerate" => Ok(CheckpointDecision::Regenerate {
            feedback: feedback.map(str::to_string),
        }),
        "save-exit" | "save" => Ok(CheckpointDecision::SaveExit),
        _ => Err(PlannerError::UnresolvedUserDecision {
            gate: CHECKPOINT_NAME.to_string(),
            choice: raw.to_string(),
            offered: CHECKPOINT_CHOICES.to_string(),
        }),
    }
}

/// Parse a gate answer against the choices a prompt offers.
pub fn parse_gate_choice(prompt: &DecisionPrompt, raw: &str) -> Result<GateChoice> {
    let unresolved = || PlannerError::UnresolvedUserDecision {
        gate: prompt.gate.clone(),
        choice: raw.to_string(),
        offered: prompt.offered_list(),
    };

    let choice: GateChoice = raw.parse().map_err(|_| unresolved())?;
    if prompt.offers(choice) {
        Ok(choice)
    } else {
        Err(unresolved())
    }
}

/// Ask the user to resolve the plan review checkpoint.
pub fn prompt_checkpoint(ui: &mut dyn UserInterface) -> Result<CheckpointDecision> {
    let options = vec![
        option("Approve - proceed to quality reviews and code generation", "approve"),
        option("Review & Edit - pause, edit the plan, then resume here", "review-edit"),
        option("Regenerate - restart approach generation with feedback", "regenerate"),
        option("Save & Exit - resume in a later session", "save-exit"),
    ];

    let prompt = Prompt {
        key: "checkpoint_decision".to_string(),
        question: "The plan is written. How do you want to proceed?".to_string(),
        prompt_type: PromptType::Select { options },
        default: None,
    };

    let answer = ask_until_valid(ui, &prompt, |raw| parse_checkpoint_decision(raw, None))?;
    match answer {
        CheckpointDecision::Regenerate { .. } => Ok(CheckpointDecision::Regenerate {
            feedback: prompt_feedback(ui, "checkpoint_feedback")?,
        }),
        other => Ok(other),
    }
}

/// Ask the user to resolve a gate escalation.
///
/// Returns the choice plus feedback when the choice is regenerate.
pub fn request_gate_decision(
    ui: &mut dyn UserInterface,
    decision: &DecisionPrompt,
) -> Result<(GateChoice, Option<String>)> {
    let options = decision
        .choices
        .iter()
        .map(|c| option(&format!("{} - {}", capitalize(c.as_str()), c.describe()), c.as_str()))
        .collect();

    let prompt = Prompt {
        key: "gate_decision".to_string(),
        question: format!("{}: how do you want to proceed?", decision.gate),
        prompt_type: PromptType::Select { options },
        default: None,
    };

    let choice = ask_until_valid(ui, &prompt, |raw| parse_gate_choice(decision, raw))?;
    let feedback = if choice == GateChoice::Regenerate {
        prompt_feedback(ui, "gate_feedback")?
    } else {
        None
    };

    Ok((choice, feedback))
}

fn ask_until_valid<T>(
    ui: &mut dyn UserInterface,
    prompt: &Prompt,
    parse: impl Fn(&str) -> Result<T>,
) -> Result<T> {
    let mut attempts = 0;
    loop {
        attempts += 1;
        let answer = ui.prompt(prompt)?.as_string();
        match parse(&answer) {
            Ok(value) => return Ok(value),
            Err(e) if attempts >= MAX_DECISION_ATTEMPTS => return Err(e),
            Err(e) => {
                warn!("Rejected answer for {}: {}", prompt.key, e);
                ui.warning(&format!("{}. Please choose again.", e));
            }
        }
    }
}

fn prompt_feedback(ui: &mut dyn UserInterface, key: &str) -> Result<Option<String>> {
    let prompt = Prompt {
        key: key.to_string(),
        question: "Feedback for regeneration (optional):".to_string(),
        prompt_type: PromptType::Input,
        default: Some(String::new()),
    };
    let text = ui.prompt(&prompt)?.as_string();
    let text = text.trim();
    Ok((!text.is_empty()).then(|| text.to_string()))
}

fn option(label: &str, value: &str) -> PromptOption {
    PromptOption {
        label: label.to_string(),
        value: value.to_string(),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
