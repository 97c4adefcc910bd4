//! Config file discovery and loading.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::merger::merge_configs;
use crate::config::schema::PlannerConfig;
use crate::error::{PlannerError, Result};
use crate::state::STATE_DIR;

/// Project config file name inside `.planner/`.
pub const CONFIG_FILE: &str = "config.yml";

/// Local, uncommitted overrides inside `.planner/`.
pub const LOCAL_CONFIG_FILE: &str = "config.local.yml";

/// Config files in merge order (later overrides earlier).
///
/// 1. Project config (`.planner/config.yml`)
/// 2. Local overrides (`.planner/config.local.yml`)
/// 3. An explicit `--config` file
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    pub project: Option<PathBuf>,
    pub project_local: Option<PathBuf>,
    pub explicit: Option<PathBuf>,
}

impl ConfigPaths {
    /// Discover the config files of a project.
    pub fn discover(project_root: &Path) -> Self {
        let dir = project_root.join(STATE_DIR);
        Self {
            project: existing(dir.join(CONFIG_FILE)),
            project_local: existing(dir.join(LOCAL_CONFIG_FILE)),
            explicit: None,
        }
    }

    /// Add an explicit config file on top of the discovered ones.
    pub fn with_explicit(mut self, path: Option<&Path>) -> Self {
        self.explicit = path.map(Path::to_path_buf);
        self
    }

    /// All config paths in merge order.
    pub fn all(&self) -> Vec<&PathBuf> {
        [&self.project, &self.project_local, &self.explicit]
            .into_iter()
            .flatten()
            .collect()
    }
}

fn existing(path: PathBuf) -> Option<PathBuf> {
    path.exists().then_some(path)
}

/// Find the nearest directory at or above `start` that holds a `.planner`
/// directory.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(STATE_DIR).is_dir() {
            return Some(current);
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Load a config file as a raw YAML value for merging.
pub fn load_config_value(path: &Path) -> Result<serde_yaml::Value> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            PlannerError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            PlannerError::Io(e)
        }
    })?;

    if content.trim().is_empty() {
        return Ok(serde_yaml::Value::Null);
    }

    serde_yaml::from_str(&content).map_err(|e| PlannerError::ConfigParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load, merge and validate the configuration of a project.
///
/// Having no config files at all is fine and yields the defaults. An
/// explicit file that does not exist is an error.
pub fn load_config(project_root: &Path, explicit: Option<&Path>) -> Result<PlannerConfig> {
    let paths = ConfigPaths::discover(project_root).with_explicit(explicit);

    let layers = paths
        .all()
        .into_iter()
        .map(|path| {
            debug!("Loading config layer {}", path.display());
            load_config_value(path)
        })
        .collect::<Result<Vec<_>>>()?;

    let merged = merge_configs(&layers);
    let config: PlannerConfig =
        serde_yaml::from_value(merged).map_err(|e| PlannerError::ConfigParseError {
            path: paths
                .all()
                .last()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| project_root.join(STATE_DIR).join(CONFIG_FILE)),
            message: format!("Failed to parse merged config: {}", e),
        })?;

    config.validate()?;
    Ok(config)
}
