//! Planner - step sequencer for a plan-writing workflow.
//!
//! A planning run walks a fixed sequence: five plan-building steps, a review
//! checkpoint, then three quality-review gates over the plan, the code diffs
//! and the documentation. Gates route failures back to their work step until
//! confidence or the iteration limit hands the decision to the user.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Configuration loading, merging and validation
//! - [`error`] - Error types and result aliases
//! - [`runner`] - Sequencer, gate policy and decisions
//! - [`state`] - Run persistence between invocations
//! - [`steps`] - The workflow's steps and their guidance
//! - [`ui`] - Prompts and terminal output
//!
//! # Example
//!
//! ```
//! use planner::runner::{NextAction, StepResult, StepSequencer};
//! use planner::steps::StepId;
//!
//! let sequencer = StepSequencer::default();
//! let run = sequencer.start(80.0).unwrap();
//!
//! let next = sequencer
//!     .advance(&run, &StepResult::done(StepId::Ordinal(1)))
//!     .unwrap();
//! assert_eq!(next.action, NextAction::Proceed { step: StepId::Ordinal(2) });
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod runner;
pub mod state;
pub mod steps;
pub mod ui;

pub use error::{PlannerError, Result};
