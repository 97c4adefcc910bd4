//! Error types for planner operations.
//!
//! This module defines [`PlannerError`], the primary error type used throughout
//! the application, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Sequencer rejections (`InvalidStepTransition`, `InvalidFindingsCount`,
//!   `InvalidThreshold`, ...) are returned to the caller and never change the
//!   run state
//! - Use `anyhow::Error` (via `PlannerError::Other`) for unexpected errors
//! - All errors should provide actionable messages for users

use std::path::PathBuf;
use thiserror::Error;

use crate::steps::StepId;

/// Core error type for planner operations.
#[derive(Debug, Error)]
pub enum PlannerError {
    /// A step result was supplied for a step that is not the current one.
    #[error("Invalid step transition: got result for step {received}, expected {expected}")]
    InvalidStepTransition { received: StepId, expected: String },

    /// A quality check reported a negative number of findings.
    #[error("Invalid findings count {count}: must be zero or greater")]
    InvalidFindingsCount { count: i64 },

    /// Confidence threshold outside [0, 100].
    #[error("Invalid confidence threshold {value}: must be between 0 and 100")]
    InvalidThreshold { value: f64 },

    /// A decision answer was not one of the offered choices.
    #[error("Unresolved decision for {gate}: '{choice}' is not one of [{offered}]")]
    UnresolvedUserDecision {
        gate: String,
        choice: String,
        offered: String,
    },

    /// The outcome kind does not fit the kind of step it was reported for.
    #[error("Step {step} expects {expected}")]
    UnexpectedOutcome { step: StepId, expected: String },

    /// A gate decision was supplied while no decision is pending.
    #[error("No decision is pending (current step: {step})")]
    NoPendingDecision { step: StepId },

    /// No persisted run exists for the project.
    #[error("No planning run found at {path}")]
    RunNotFound { path: PathBuf },

    /// A persisted run already exists and would be overwritten.
    #[error("A planning run already exists at {path}")]
    RunAlreadyExists { path: PathBuf },

    /// Failed to parse persisted run state.
    #[error("Failed to parse run state at {path}: {message}")]
    StateParseError { path: PathBuf, message: String },

    /// Failed to serialize run state for saving.
    #[error("Failed to serialize run state: {message}")]
    StateSerializeError { message: String },

    /// The run refers to a gate the workflow does not define.
    #[error("No gate configured for {reference}")]
    GateNotFound { reference: String },

    /// A prompt needs an answer but nobody can give one interactively.
    #[error("Cannot prompt for '{key}' in non-interactive mode (set {env_key})")]
    PromptUnanswered { key: String, env_key: String },

    /// An explicitly requested config file does not exist.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid configuration structure or values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for planner operations.
pub type Result<T> = std::result::Result<T, PlannerError>;
