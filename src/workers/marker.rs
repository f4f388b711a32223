// src/workers/marker.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::errors::Result;
use crate::fs::FileSystem;
use crate::workers::{ActiveWorkerRecord, ActiveWorkers};

/// File extension of marker files.
pub const MARKER_EXTENSION: &str = "active";

/// Claims stored as `<dir>/<task_id>.active` JSON files.
///
/// Markers survive a crashed scheduler and are simply rediscovered on the
/// next scan. A crashed *worker* leaves its marker behind until it is
/// released by hand (`taskwave release <id>`).
#[derive(Debug, Clone)]
pub struct MarkerDirRegistry {
    fs: Arc<dyn FileSystem>,
    dir: PathBuf,
}

impl MarkerDirRegistry {
    pub fn new(fs: Arc<dyn FileSystem>, dir: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            dir: dir.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn marker_path(&self, task_id: &str) -> PathBuf {
        self.dir.join(format!("{task_id}.{MARKER_EXTENSION}"))
    }

    fn read_marker(&self, path: &Path) -> Option<ActiveWorkerRecord> {
        let contents = match self.fs.read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                warn!(path = ?path, error = %e, "unreadable worker marker; ignoring");
                return None;
            }
        };
        match serde_json::from_str::<ActiveWorkerRecord>(&contents) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(path = ?path, error = %e, "invalid worker marker; ignoring");
                None
            }
        }
    }
}

impl ActiveWorkers for MarkerDirRegistry {
    fn list_active(&self) -> Result<Vec<ActiveWorkerRecord>> {
        if !self.fs.is_dir(&self.dir) {
            return Ok(Vec::new());
        }

        let mut records: Vec<ActiveWorkerRecord> = self
            .fs
            .read_dir(&self.dir)?
            .into_iter()
            .filter(|p| p.extension().and_then(|e| e.to_str()) == Some(MARKER_EXTENSION))
            .filter(|p| self.fs.is_file(p))
            .filter_map(|p| self.read_marker(&p))
            .collect();

        records.sort_by(|a, b| a.task_id.cmp(&b.task_id));
        debug!(dir = ?self.dir, count = records.len(), "scanned worker markers");
        Ok(records)
    }

    fn claim(&self, record: &ActiveWorkerRecord) -> Result<()> {
        let path = self.marker_path(&record.task_id);
        let mut json = serde_json::to_vec_pretty(record)?;
        json.push(b'\n');
        self.fs.write(&path, &json)?;
        info!(task = %record.task_id, role = %record.role, "worker claim created");
        Ok(())
    }

    fn release(&self, task_id: &str) -> Result<bool> {
        let path = self.marker_path(task_id);
        if !self.fs.exists(&path) {
            debug!(task = %task_id, "no worker claim to release");
            return Ok(false);
        }
        self.fs.remove_file(&path)?;
        info!(task = %task_id, "worker claim released");
        Ok(true)
    }
}
