//! Persistent run storage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{PlannerError, Result};
use crate::runner::RunContext;

/// Directory holding planner state inside a project.
pub const STATE_DIR: &str = ".planner";

/// File name of the persisted run.
pub const RUN_FILE: &str = "run.yml";

/// Schema version of [`RunSnapshot`].
pub const STATE_VERSION: u32 = 1;

/// A persisted run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSnapshot {
    /// Schema version for migration.
    pub version: u32,

    /// When the run was last written.
    pub saved_at: DateTime<Utc>,

    /// The run itself.
    pub context: RunContext,
}

/// Reads and writes the run of one project.
#[derive(Debug, Clone)]
pub struct RunStore {
    root: PathBuf,
}

impl RunStore {
    /// Create a store for the project at `project_root`.
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            root: project_root.into(),
        }
    }

    /// The project root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The `.planner` directory.
    pub fn state_dir(&self) -> PathBuf {
        self.root.join(STATE_DIR)
    }

    /// Path of the run file.
    pub fn path(&self) -> PathBuf {
        self.state_dir().join(RUN_FILE)
    }

    /// Whether a run has been persisted.
    pub fn exists(&self) -> bool {
        self.path().exists()
    }

    /// Load the persisted run.
    pub fn load(&self) -> Result<RunSnapshot> {
        let path = self.path();
        if !path.exists() {
            return Err(PlannerError::RunNotFound { path });
        }

        let content = fs::read_to_string(&path)?;
        let snapshot: RunSnapshot =
            serde_yaml::from_str(&content).map_err(|e| PlannerError::StateParseError {
                path: path.clone(),
                message: e.to_string(),
            })?;

        if snapshot.version > STATE_VERSION {
            return Err(PlannerError::StateParseError {
                path,
                message: format!(
                    "state version {} is newer than supported version {}",
                    snapshot.version, STATE_VERSION
                ),
            });
        }

        debug!(
            "Loaded run at step {} (saved {})",
            snapshot.context.current_step, snapshot.saved_at
        );
        Ok(snapshot)
    }

    /// Persist a run.
    ///
    /// The file is written to a temporary sibling and renamed into place,
    /// so a crash never leaves a partially written run behind.
    pub fn save(&self, context: &RunContext) -> Result<RunSnapshot> {
        fs::create_dir_all(self.state_dir())?;

        let snapshot = RunSnapshot {
            version: STATE_VERSION,
            saved_at: Utc::now(),
            context: context.clone(),
        };

        let path = self.path();
        let content =
            serde_yaml::to_string(&snapshot).map_err(|e| PlannerError::StateSerializeError {
                message: e.to_string(),
            })?;

        let temp_path = self.temp_path();
        fs::write(&temp_path, &content)?;
        if let Err(e) = fs::rename(&temp_path, &path) {
            fs::remove_file(&temp_path).ok();
            return Err(e.into());
        }

        debug!("Saved run at step {} to {}", context.current_step, path.display());
        Ok(snapshot)
    }

    /// Remove the persisted run and any interrupted write, if present.
    pub fn clear(&self) -> Result<()> {
        for path in [self.path(), self.temp_path()] {
            if path.exists() {
                fs::remove_file(&path)?;
                debug!("Removed {}", path.display());
            }
        }
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        self.path().with_extension("yml.tmp")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::{StepResult, StepSequencer};
    use crate::steps::StepId;
    use tempfile::TempDir;

    #[test]
    fn load_missing_run_fails() {
        let temp = TempDir::new().unwrap();
        let store = RunStore::new(temp.path());

        assert!(!store.exists());
        let err = store.load().unwrap_err();
        assert!(matches!(err, PlannerError::RunNotFound { .. }));
    }

    #[test]
    fn save_then_load_round_trips() {
        let temp = TempDir::new().unwrap();
        let store = RunStore::new(temp.path());
        let sequencer = StepSequencer::default();

        let ctx = sequencer.start(75.0).unwrap();
        let ctx = sequencer
            .advance(&ctx, &StepResult::done(StepId::Ordinal(1)))
            .unwrap()
            .context;

        store.save(&ctx).unwrap();
        let loaded = store.load().unwrap();

        assert_eq!(loaded.version, STATE_VERSION);
        assert_eq!(loaded.context, ctx);
    }

    #[test]
    fn save_uses_atomic_write() {
        let temp = TempDir::new().unwrap();
        let store = RunStore::new(temp.path());
        let ctx = StepSequencer::default().start_default().unwrap();

        store.save(&ctx).unwrap();

        assert!(store.path().exists());
        assert!(!store.path().with_extension("yml.tmp").exists());
    }

    #[test]
    fn failed_rename_removes_temp_file() {
        let temp = TempDir::new().unwrap();
        let store = RunStore::new(temp.path());
        // A non-empty directory where the run file belongs makes the rename fail.
        fs::create_dir_all(store.path().join("blocker")).unwrap();
        let ctx = StepSequencer::default().start_default().unwrap();

        let err = store.save(&ctx).unwrap_err();

        assert!(matches!(err, PlannerError::Io(_)));
        assert!(!store.temp_path().exists());
    }

    #[test]
    fn save_creates_state_dir() {
        let temp = TempDir::new().unwrap();
        let store = RunStore::new(temp.path());
        let ctx = StepSequencer::default().start_default().unwrap();

        store.save(&ctx).unwrap();

        assert!(temp.path().join(".planner").is_dir());
        assert!(temp.path().join(".planner/run.yml").is_file());
    }

    #[test]
    fn corrupt_state_reports_parse_error() {
        let temp = TempDir::new().unwrap();
        let store = RunStore::new(temp.path());
        fs::create_dir_all(store.state_dir()).unwrap();
        fs::write(store.path(), "version: [not, a, number").unwrap();

        let err = store.load().unwrap_err();
        assert!(matches!(err, PlannerError::StateParseError { .. }));
    }

    #[test]
    fn newer_state_version_is_rejected() {
        let temp = TempDir::new().unwrap();
        let store = RunStore::new(temp.path());
        let ctx = StepSequencer::default().start_default().unwrap();
        let mut snapshot = store.save(&ctx).unwrap();
        snapshot.version = STATE_VERSION + 1;
        fs::write(store.path(), serde_yaml::to_string(&snapshot).unwrap()).unwrap();

        let err = store.load().unwrap_err();
        assert!(err.to_string().contains("newer"));
    }

    #[test]
    fn clear_removes_run() {
        let temp = TempDir::new().unwrap();
        let store = RunStore::new(temp.path());
        let ctx = StepSequencer::default().start_default().unwrap();
        store.save(&ctx).unwrap();

        store.clear().unwrap();
        assert!(!store.exists());

        // Clearing twice is fine.
        store.clear().unwrap();
    }

    #[test]
    fn clear_removes_interrupted_write() {
        let temp = TempDir::new().unwrap();
        let store = RunStore::new(temp.path());
        fs::create_dir_all(store.state_dir()).unwrap();
        fs::write(store.temp_path(), "partial").unwrap();

        store.clear().unwrap();

        assert!(!store.temp_path().exists());
    }
}
