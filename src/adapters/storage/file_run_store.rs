//! File-based Run Store Adapter
//!
//! Stores run state as YAML and the approved plan as JSON on disk, one
//! directory per run:
//!
//! ```text
//! <base>/<run_id>/state.yaml
//! <base>/<run_id>/plan.json
//! ```
//!
//! Files are written to a temporary sibling and renamed into place, so a
//! crash mid-write never leaves a truncated state file behind.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;

use crate::domain::foundation::RunId;
use crate::domain::workflow::{FinalizedPlan, WorkflowState};
use crate::ports::{check_version, RunStore, RunStoreError, RunSummary};

const STATE_FILE: &str = "state.yaml";
const PLAN_FILE: &str = "plan.json";

/// File-based storage for workflow runs
#[derive(Debug)]
pub struct FileRunStore {
    base_path: PathBuf,
    /// Serializes the version check and write within this process.
    write_lock: Mutex<()>,
}

impl FileRunStore {
    /// Create a new file store with a base directory
    ///
    /// # Example
    /// ```ignore
    /// let store = FileRunStore::new("./data/runs");
    /// ```
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn run_dir(&self, run_id: RunId) -> PathBuf {
        self.base_path.join(run_id.to_string())
    }

    fn state_file_path(&self, run_id: RunId) -> PathBuf {
        self.run_dir(run_id).join(STATE_FILE)
    }

    fn plan_file_path(&self, run_id: RunId) -> PathBuf {
        self.run_dir(run_id).join(PLAN_FILE)
    }

    async fn ensure_dir(&self, path: &Path) -> Result<(), RunStoreError> {
        fs::create_dir_all(path)
            .await
            .map_err(|e| RunStoreError::IoError(e.to_string()))
    }

    async fn write_atomic(&self, path: &Path, contents: String) -> Result<(), RunStoreError> {
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, contents)
            .await
            .map_err(|e| RunStoreError::IoError(e.to_string()))?;
        fs::rename(&tmp, path)
            .await
            .map_err(|e| RunStoreError::IoError(e.to_string()))
    }

    async fn read_state_file(&self, path: &Path) -> Result<WorkflowState, RunStoreError> {
        let yaml = fs::read_to_string(path)
            .await
            .map_err(|e| RunStoreError::IoError(e.to_string()))?;
        serde_yaml::from_str(&yaml).map_err(|e| RunStoreError::DeserializationFailed(e.to_string()))
    }
}

#[async_trait]
impl RunStore for FileRunStore {
    async fn save_state(&self, state: &WorkflowState) -> Result<(), RunStoreError> {
        let run_id = state.run_id();
        let _guard = self.write_lock.lock().await;

        let file_path = self.state_file_path(run_id);
        let stored = if file_path.exists() {
            Some(self.read_state_file(&file_path).await?.version())
        } else {
            None
        };
        check_version(run_id, stored, state.version())?;

        self.ensure_dir(&self.run_dir(run_id)).await?;

        let yaml = serde_yaml::to_string(state)
            .map_err(|e| RunStoreError::SerializationFailed(e.to_string()))?;

        self.write_atomic(&file_path, yaml).await
    }

    async fn load_state(&self, run_id: RunId) -> Result<WorkflowState, RunStoreError> {
        let file_path = self.state_file_path(run_id);

        if !file_path.exists() {
            return Err(RunStoreError::NotFound(run_id));
        }

        self.read_state_file(&file_path).await
    }

    async fn exists(&self, run_id: RunId) -> Result<bool, RunStoreError> {
        Ok(self.state_file_path(run_id).exists())
    }

    async fn delete(&self, run_id: RunId) -> Result<(), RunStoreError> {
        let dir = self.run_dir(run_id);

        if dir.exists() {
            fs::remove_dir_all(&dir)
                .await
                .map_err(|e| RunStoreError::IoError(e.to_string()))?;
        }

        Ok(())
    }

    async fn list_runs(&self) -> Result<Vec<RunSummary>, RunStoreError> {
        if !self.base_path.exists() {
            return Ok(Vec::new());
        }

        let mut entries = fs::read_dir(&self.base_path)
            .await
            .map_err(|e| RunStoreError::IoError(e.to_string()))?;

        let mut runs = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| RunStoreError::IoError(e.to_string()))?
        {
            // Skip anything that is not a run directory
            let Some(run_id) = entry
                .file_name()
                .to_str()
                .and_then(|name| name.parse::<RunId>().ok())
            else {
                continue;
            };

            let state_path = self.state_file_path(run_id);
            if state_path.exists() {
                let state = self.read_state_file(&state_path).await?;
                runs.push(RunSummary::from_state(&state));
            }
        }

        runs.sort_by_key(|summary| summary.run_id);
        Ok(runs)
    }

    async fn save_final_plan(
        &self,
        run_id: RunId,
        plan: &FinalizedPlan,
    ) -> Result<(), RunStoreError> {
        self.ensure_dir(&self.run_dir(run_id)).await?;

        let json = serde_json::to_string_pretty(plan)
            .map_err(|e| RunStoreError::SerializationFailed(e.to_string()))?;

        self.write_atomic(&self.plan_file_path(run_id), json).await
    }

    async fn load_final_plan(&self, run_id: RunId) -> Result<FinalizedPlan, RunStoreError> {
        let file_path = self.plan_file_path(run_id);

        if !file_path.exists() {
            return Err(RunStoreError::PlanNotFound(run_id));
        }

        let json = fs::read_to_string(&file_path)
            .await
            .map_err(|e| RunStoreError::IoError(e.to_string()))?;

        serde_json::from_str(&json).map_err(|e| RunStoreError::DeserializationFailed(e.to_string()))
    }
}
