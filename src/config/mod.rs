//! Planner configuration.
//!
//! - [`loader`] - Finding and reading config files
//! - [`merger`] - Layering them
//! - [`schema`] - The typed result and its validation

pub mod loader;
pub mod merger;
pub mod schema;

pub use loader::{
    find_project_root, load_config, load_config_value, ConfigPaths, CONFIG_FILE,
    LOCAL_CONFIG_FILE,
};
pub use merger::{deep_merge, merge_configs};
pub use schema::{GateOverride, PlannerConfig};
