// src/workers/memory.rs

use std::collections::BTreeMap;
use std::sync::Mutex;

use tracing::info;

use crate::errors::Result;
use crate::types::TaskId;
use crate::workers::{ActiveWorkerRecord, ActiveWorkers};

/// Claims held in memory only.
#[derive(Debug, Default)]
pub struct MemoryWorkerRegistry {
    claims: Mutex<BTreeMap<TaskId, ActiveWorkerRecord>>,
}

impl MemoryWorkerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_claims(records: impl IntoIterator<Item = ActiveWorkerRecord>) -> Self {
        Self {
            claims: Mutex::new(
                records
                    .into_iter()
                    .map(|r| (r.task_id.clone(), r))
                    .collect(),
            ),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<TaskId, ActiveWorkerRecord>> {
        self.claims.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl ActiveWorkers for MemoryWorkerRegistry {
    fn list_active(&self) -> Result<Vec<ActiveWorkerRecord>> {
        Ok(self.lock().values().cloned().collect())
    }

    fn claim(&self, record: &ActiveWorkerRecord) -> Result<()> {
        self.lock().insert(record.task_id.clone(), record.clone());
        info!(task = %record.task_id, "worker claim created (memory)");
        Ok(())
    }

    fn release(&self, task_id: &str) -> Result<bool> {
        Ok(self.lock().remove(task_id).is_some())
    }
}
