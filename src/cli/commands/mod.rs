//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.
//!
//! Every invocation loads the persisted run, applies one change through the
//! sequencer and saves the result, so a planning session can stop after any
//! command and resume later.

pub mod complete;
pub mod completions;
pub mod decide;
pub mod dispatcher;
pub mod display;
pub mod show;
pub mod start;
pub mod status;

pub use dispatcher::{Command, CommandDispatcher, CommandResult, ProjectContext};
