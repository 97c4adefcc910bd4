//! Run persistence.
//!
//! A planning run spans several CLI invocations. Between them the
//! [`RunContext`](crate::runner::RunContext) lives in the project's
//! `.planner/run.yml`.

pub mod store;

pub use store::{RunSnapshot, RunStore, RUN_FILE, STATE_DIR, STATE_VERSION};
