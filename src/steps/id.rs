//! Step identifiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier of a workflow step.
///
/// Ordinal steps are numbered from 1. The plan review checkpoint sits between
/// two ordinal steps and has no number of its own; its textual form is
/// `review`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum StepId {
    /// A numbered step.
    Ordinal(u8),
    /// The plan review checkpoint.
    Checkpoint,
}

impl StepId {
    /// Textual form of the checkpoint step.
    pub const CHECKPOINT_NAME: &'static str = "review";
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ordinal(n) => f.pad(&n.to_string()),
            Self::Checkpoint => f.pad(Self::CHECKPOINT_NAME),
        }
    }
}

impl FromStr for StepId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.to_lowercase().as_str() {
            "review" | "checkpoint" => return Ok(Self::Checkpoint),
            _ => {}
        }
        match s.parse::<u8>() {
            Ok(0) => Err("step must be >= 1".to_string()),
            Ok(n) => Ok(Self::Ordinal(n)),
            Err(_) => Err(format!("invalid step '{}': expected a number or 'review'", s)),
        }
    }
}

impl TryFrom<String> for StepId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<StepId> for String {
    fn from(id: StepId) -> Self {
        id.to_string()
    }
}

/// How the sequencer treats a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    /// Advances unconditionally to the next step.
    Ordinary,
    /// Blocks for an explicit decision among a fixed choice set.
    Checkpoint,
    /// Advances depending on a quality check and the gate policy.
    Gate,
}
