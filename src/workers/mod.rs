// src/workers/mod.rs

//! Active-worker registry.
//!
//! Tracks which tasks currently occupy an execution slot, independently of
//! the run state, so that a worker whose process died without updating the
//! state still counts against the concurrency limit until someone releases
//! its claim.
//!
//! - [`marker`] stores one marker file per claim in a directory.
//! - [`memory`] keeps claims in memory (tests).

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::types::TaskId;

pub mod marker;
pub mod memory;

pub use marker::MarkerDirRegistry;
pub use memory::MemoryWorkerRegistry;

/// One running worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveWorkerRecord {
    pub task_id: TaskId,
    pub role: String,
    pub start_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
}

impl ActiveWorkerRecord {
    pub fn new(task_id: impl Into<TaskId>, role: impl Into<String>, start_time: DateTime<Utc>) -> Self {
        Self {
            task_id: task_id.into(),
            role: role.into(),
            start_time,
            prompt: None,
        }
    }

    pub fn with_prompt(mut self, prompt: Option<String>) -> Self {
        self.prompt = prompt;
        self
    }
}

/// Where worker claims live.
///
/// Implementations must treat `list_active` as ground truth for "which slots
/// are occupied"; the scheduler never consults the run state for that.
pub trait ActiveWorkers: Send + Sync {
    /// All current claims, sorted by task id.
    fn list_active(&self) -> Result<Vec<ActiveWorkerRecord>>;

    /// Create (or overwrite) the claim for `record.task_id`.
    fn claim(&self, record: &ActiveWorkerRecord) -> Result<()>;

    /// Remove the claim for `task_id`. Returns `false` if there was none.
    fn release(&self, task_id: &str) -> Result<bool>;

    fn active_task_ids(&self) -> Result<BTreeSet<TaskId>> {
        Ok(self
            .list_active()?
            .into_iter()
            .map(|r| r.task_id)
            .collect())
    }
}
