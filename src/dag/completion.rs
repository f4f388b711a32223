// src/dag/completion.rs

//! Completion predicates (`done_when`) that let a task be recognised as
//! already finished without going through the scheduler.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use regex::Regex;
use tracing::{debug, trace};

use crate::config::model::DoneWhenConfig;
use crate::errors::{Result, TaskwaveError};
use crate::fs::FileSystem;

/// Compiled form of a task's `done_when` table.
#[derive(Debug, Clone)]
pub struct CompletionCheck {
    exists: Vec<PathBuf>,
    contains: Vec<(PathBuf, Vec<Regex>)>,
    min_bytes: Vec<(PathBuf, u64)>,
}

impl CompletionCheck {
    pub fn from_config(task_id: &str, cfg: &DoneWhenConfig) -> Result<Self> {
        let mut contains = Vec::with_capacity(cfg.contains.len());
        for check in cfg.contains.iter() {
            let patterns = check
                .patterns
                .iter()
                .map(|p| {
                    Regex::new(p).map_err(|e| {
                        TaskwaveError::ConfigError(format!(
                            "task '{}' has invalid `done_when.contains` pattern '{}': {}",
                            task_id, p, e
                        ))
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            contains.push((PathBuf::from(&check.path), patterns));
        }

        Ok(Self {
            exists: cfg.exists.iter().map(PathBuf::from).collect(),
            contains,
            min_bytes: cfg
                .min_bytes
                .iter()
                .map(|c| (PathBuf::from(&c.path), c.bytes))
                .collect(),
        })
    }

    /// Evaluate every condition against `fs`, resolving paths under `root`.
    ///
    /// Unreadable files count as "not done"; an error here never aborts a
    /// scheduling cycle.
    pub fn is_satisfied(&self, fs: &dyn FileSystem, root: &Path) -> bool {
        for rel in self.exists.iter() {
            if !fs.exists(&root.join(rel)) {
                trace!(path = ?rel, "done_when.exists not satisfied");
                return false;
            }
        }

        for (rel, patterns) in self.contains.iter() {
            let path = root.join(rel);
            let contents = match fs.read_to_string(&path) {
                Ok(c) => c,
                Err(_) => {
                    trace!(path = ?rel, "done_when.contains: file unreadable");
                    return false;
                }
            };
            if let Some(missing) = patterns.iter().find(|re| !re.is_match(&contents)) {
                trace!(path = ?rel, pattern = %missing, "done_when.contains not satisfied");
                return false;
            }
        }

        for (rel, bytes) in self.min_bytes.iter() {
            match fs.file_len(&root.join(rel)) {
                Ok(len) if len >= *bytes => {}
                _ => {
                    trace!(path = ?rel, min = bytes, "done_when.min_bytes not satisfied");
                    return false;
                }
            }
        }

        true
    }
}

/// Filesystem handle plus project root used to evaluate completion checks.
#[derive(Debug, Clone)]
pub struct CompletionProbe {
    fs: Arc<dyn FileSystem>,
    root: PathBuf,
}

impl CompletionProbe {
    pub fn new(fs: Arc<dyn FileSystem>, root: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            root: root.into(),
        }
    }

    pub fn is_done(&self, task_id: &str, check: &CompletionCheck) -> bool {
        let done = check.is_satisfied(self.fs.as_ref(), &self.root);
        debug!(task = %task_id, done, "evaluated completion check");
        done
    }
}
