// src/state/store.rs

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::validate::is_valid_task_id;
use crate::dag::TaskRegistry;
use crate::errors::{Result, TaskwaveError};
use crate::fs::FileSystem;
use crate::state::run_state::RunState;
use crate::types::TaskId;

/// Advisory counters written next to the run state after a wave.
///
/// Ignored on load; nothing may depend on them for correctness.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSummary {
    pub total_tasks: usize,
    pub ready_tasks: Vec<TaskId>,
    pub blocked_tasks: usize,
}

/// Durable store for [`RunState`].
///
/// The mutators are each a fresh load/mutate/save cycle with no caching in
/// between. Concurrent writers race (last writer wins); a single scheduler
/// process is assumed.
pub trait StateStore: Send + Sync {
    /// Load the current state. A missing document yields the empty state; an
    /// unreadable or malformed one is an error.
    fn load(&self) -> Result<RunState>;

    /// Overwrite the stored state, attaching optional advisory counters.
    fn save_with_summary(&self, state: &RunState, summary: Option<&StateSummary>) -> Result<()>;

    fn save(&self, state: &RunState) -> Result<()> {
        self.save_with_summary(state, None)
    }

    /// Mark `id` as in progress. Returns the saved state.
    fn mark_in_progress(&self, registry: &TaskRegistry, id: &str) -> Result<RunState> {
        let task = registry.task(id)?;
        let mut state = self.load()?;
        if state.admit(task, Utc::now())? {
            self.save(&state)?;
            info!(task = %id, "task marked in progress");
        }
        Ok(state)
    }

    /// Mark `id` as completed. Returns the saved state.
    fn mark_completed(&self, registry: &TaskRegistry, id: &str) -> Result<RunState> {
        let task = registry.task(id)?;
        let mut state = self.load()?;
        if state.complete(task)? {
            self.save(&state)?;
            info!(task = %id, "task marked completed");
        }
        Ok(state)
    }

    /// Return an in-progress task to unseen. Returns whether anything changed.
    ///
    /// Ids no longer in the registry are accepted so leftovers from removed
    /// tasks can be cleared.
    fn reset(&self, registry: &TaskRegistry, id: &str) -> Result<bool> {
        if !registry.contains(id) {
            if !is_valid_task_id(id) {
                return Err(TaskwaveError::TaskNotFound(id.to_string()));
            }
            warn!(task = %id, "resetting a task that is not in the registry");
        }
        let mut state = self.load()?;
        let changed = state.reset(id)?;
        if changed {
            self.save(&state)?;
            info!(task = %id, "in-progress task reset to unseen");
        }
        Ok(changed)
    }
}

/// Serialized layout of the state document.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StateDocument<'a> {
    #[serde(flatten)]
    state: &'a RunState,
    timestamp: DateTime<Utc>,
    #[serde(flatten)]
    summary: Option<&'a StateSummary>,
}

/// Stores the run state as a JSON document (default `.taskwave/state.json`).
#[derive(Debug, Clone)]
pub struct JsonStateStore {
    fs: Arc<dyn FileSystem>,
    path: PathBuf,
}

impl JsonStateStore {
    pub fn new(fs: Arc<dyn FileSystem>, path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn corrupt(&self, reason: impl Into<String>) -> TaskwaveError {
        TaskwaveError::StateCorrupt {
            path: self.path.clone(),
            reason: reason.into(),
        }
    }
}

impl StateStore for JsonStateStore {
    fn load(&self) -> Result<RunState> {
        if !self.fs.exists(&self.path) {
            debug!(path = ?self.path, "no state document yet; starting from empty state");
            return Ok(RunState::default());
        }

        let contents = self
            .fs
            .read_to_string(&self.path)
            .map_err(|e| self.corrupt(format!("{e:#}")))?;
        let state: RunState =
            serde_json::from_str(&contents).map_err(|e| self.corrupt(e.to_string()))?;
        state.check_disjoint().map_err(|e| self.corrupt(e))?;

        debug!(
            path = ?self.path,
            completed = state.completed_tasks.len(),
            in_progress = state.in_progress_tasks.len(),
            "loaded run state"
        );
        Ok(state)
    }

    fn save_with_summary(&self, state: &RunState, summary: Option<&StateSummary>) -> Result<()> {
        let doc = StateDocument {
            state,
            timestamp: Utc::now(),
            summary,
        };
        let mut json = serde_json::to_vec_pretty(&doc)?;
        json.push(b'\n');
        self.fs.write(&self.path, &json)?;
        debug!(path = ?self.path, "saved run state");
        Ok(())
    }
}

/// Keeps the run state in memory only (lost on exit). Used in tests.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    state: Mutex<RunState>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: RunState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }

    /// Snapshot of the stored state.
    pub fn snapshot(&self) -> RunState {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl StateStore for MemoryStateStore {
    fn load(&self) -> Result<RunState> {
        Ok(self.snapshot())
    }

    fn save_with_summary(&self, state: &RunState, _summary: Option<&StateSummary>) -> Result<()> {
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = state.clone();
        Ok(())
    }
}
