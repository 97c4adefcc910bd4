//! The planning workflow's steps.
//!
//! - [`StepId`] - Step identifiers (`1`..`13` and the `review` checkpoint)
//! - [`Workflow`] - The fixed step sequence and its gate table
//! - [`guidance_for`] - What the collaborator does at each step
//!
//! # Example
//!
//! ```
//! use planner::steps::{StepId, StepKind, Workflow};
//!
//! let workflow = Workflow::planner();
//! assert_eq!(workflow.next_after(StepId::Ordinal(5)), Some(StepId::Checkpoint));
//! assert_eq!(workflow.step(StepId::Ordinal(7)).unwrap().kind, StepKind::Gate);
//! ```

pub mod catalog;
pub mod guidance;
pub mod id;

pub use catalog::{Workflow, WorkflowStep, APPROVE_STEP, GATE_NAMES, REGENERATE_STEP};
pub use guidance::{
    fix_mode_actions, guidance_for, StepGuidance, PLANNING_VERIFICATION, PLAN_APPROVED,
};
pub use id::{StepId, StepKind};
