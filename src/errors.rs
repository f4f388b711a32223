// src/errors.rs

//! Crate-wide error type and result alias.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TaskwaveError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Cycle detected in task graph: {0}")]
    DagCycle(String),

    #[error("State document {path:?} is corrupt: {reason}")]
    StateCorrupt { path: PathBuf, reason: String },

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Cannot transition task '{task}': {reason}")]
    InvalidTransition { task: String, reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TaskwaveError {
    /// Process exit code for this error.
    ///
    /// - `2`: the task registry could not be loaded (bad config, cycle)
    /// - `3`: the persisted state document is corrupt
    /// - `1`: anything else
    pub fn exit_code(&self) -> i32 {
        match self {
            TaskwaveError::ConfigError(_)
            | TaskwaveError::DagCycle(_)
            | TaskwaveError::TomlError(_) => 2,
            TaskwaveError::StateCorrupt { .. } => 3,
            _ => 1,
        }
    }

    pub(crate) fn invalid_transition(task: &str, reason: impl Into<String>) -> Self {
        TaskwaveError::InvalidTransition {
            task: task.to_string(),
            reason: reason.into(),
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, TaskwaveError>;
