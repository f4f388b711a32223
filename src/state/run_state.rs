// src/state/run_state.rs

//! The durable progress record and its allowed transitions.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dag::Task;
use crate::errors::{Result, TaskwaveError};
use crate::types::TaskId;

/// Which tasks are completed and which are claimed but not yet completed.
///
/// `completed_tasks` and `in_progress_tasks` are required in the persisted
/// document; a document missing either is rejected on load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunState {
    pub completed_tasks: BTreeSet<TaskId>,
    pub in_progress_tasks: BTreeSet<TaskId>,
    /// Admission time per in-progress task. Advisory: only used to decide
    /// when an unclaimed in-progress task counts as stuck.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub in_progress_since: BTreeMap<TaskId, DateTime<Utc>>,
}

impl RunState {
    pub fn is_completed(&self, id: &str) -> bool {
        self.completed_tasks.contains(id)
    }

    pub fn is_in_progress(&self, id: &str) -> bool {
        self.in_progress_tasks.contains(id)
    }

    /// Dependencies of `task` that are not completed yet, in declaration order.
    pub fn missing_dependencies(&self, task: &Task) -> Vec<TaskId> {
        task.dependencies
            .iter()
            .filter(|dep| !self.is_completed(dep))
            .cloned()
            .collect()
    }

    /// Check the structural invariant `completed ∩ in_progress = ∅`.
    pub fn check_disjoint(&self) -> std::result::Result<(), String> {
        let overlap: Vec<&str> = self
            .completed_tasks
            .intersection(&self.in_progress_tasks)
            .map(|s| s.as_str())
            .collect();
        if overlap.is_empty() {
            Ok(())
        } else {
            Err(format!(
                "tasks listed as both completed and in progress: {}",
                overlap.join(", ")
            ))
        }
    }

    /// Admit `task` as in progress.
    ///
    /// Fails if the task is already completed or any dependency is not
    /// completed. Re-admitting an in-progress task is a no-op and returns
    /// `false`.
    pub fn admit(&mut self, task: &Task, now: DateTime<Utc>) -> Result<bool> {
        if self.is_completed(&task.id) {
            return Err(TaskwaveError::invalid_transition(
                &task.id,
                "task is already completed",
            ));
        }
        if self.is_in_progress(&task.id) {
            debug!(task = %task.id, "task already in progress; nothing to do");
            return Ok(false);
        }

        let missing = self.missing_dependencies(task);
        if !missing.is_empty() {
            return Err(TaskwaveError::invalid_transition(
                &task.id,
                format!("dependencies not completed: {}", missing.join(", ")),
            ));
        }

        self.in_progress_tasks.insert(task.id.clone());
        self.in_progress_since.insert(task.id.clone(), now);
        Ok(true)
    }

    /// Record `task` as completed.
    ///
    /// Completing an already-completed task is a no-op returning `false`.
    /// Completion with unfinished dependencies is refused so the dependency
    /// invariant holds for completed tasks too.
    pub fn complete(&mut self, task: &Task) -> Result<bool> {
        if self.is_completed(&task.id) {
            debug!(task = %task.id, "task already completed; nothing to do");
            return Ok(false);
        }

        let missing = self.missing_dependencies(task);
        if !missing.is_empty() {
            return Err(TaskwaveError::invalid_transition(
                &task.id,
                format!("dependencies not completed: {}", missing.join(", ")),
            ));
        }

        self.in_progress_tasks.remove(&task.id);
        self.in_progress_since.remove(&task.id);
        self.completed_tasks.insert(task.id.clone());
        Ok(true)
    }

    /// Operator reconciliation: put an in-progress task back to unseen.
    ///
    /// Completed tasks cannot be reset. Returns `false` if the task was not
    /// in progress.
    pub fn reset(&mut self, id: &str) -> Result<bool> {
        if self.is_completed(id) {
            return Err(TaskwaveError::invalid_transition(
                id,
                "completed tasks cannot be reset",
            ));
        }
        self.in_progress_since.remove(id);
        Ok(self.in_progress_tasks.remove(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Priority;

    fn task(id: &str, deps: &[&str]) -> Task {
        Task {
            id: id.to_string(),
            name: id.to_string(),
            description: None,
            dependencies: deps.iter().map(|s| s.to_string()).collect(),
            priority: Priority::Medium,
            estimated_hours: 1.0,
            prompt: None,
            cmd: None,
            role: id.to_string(),
            completion: None,
            declaration_index: 0,
        }
    }

    #[test]
    fn admit_requires_completed_dependencies() {
        let mut state = RunState::default();
        let c = task("C", &["A", "B"]);

        let err = state.admit(&c, Utc::now()).unwrap_err();
        assert!(matches!(err, TaskwaveError::InvalidTransition { ref reason, .. } if reason.contains("A, B")));

        state.completed_tasks.insert("A".into());
        state.completed_tasks.insert("B".into());
        assert!(state.admit(&c, Utc::now()).unwrap());
        assert!(state.is_in_progress("C"));
        assert!(state.in_progress_since.contains_key("C"));
        assert!(!state.admit(&c, Utc::now()).unwrap());
    }

    #[test]
    fn complete_moves_out_of_in_progress() {
        let mut state = RunState::default();
        let a = task("A", &[]);
        state.admit(&a, Utc::now()).unwrap();

        assert!(state.complete(&a).unwrap());
        assert!(state.is_completed("A"));
        assert!(!state.is_in_progress("A"));
        assert!(state.in_progress_since.is_empty());
        assert!(!state.complete(&a).unwrap());
        assert!(state.check_disjoint().is_ok());
    }

    #[test]
    fn completed_is_terminal() {
        let mut state = RunState::default();
        let a = task("A", &[]);
        state.complete(&a).unwrap();

        assert!(state.admit(&a, Utc::now()).is_err());
        assert!(state.reset("A").is_err());
        assert!(state.is_completed("A"));
    }

    #[test]
    fn reset_returns_task_to_unseen() {
        let mut state = RunState::default();
        let a = task("A", &[]);
        state.admit(&a, Utc::now()).unwrap();

        assert!(state.reset("A").unwrap());
        assert!(!state.is_in_progress("A"));
        assert!(!state.reset("A").unwrap());
    }

    #[test]
    fn disjointness_violation_is_reported() {
        let mut state = RunState::default();
        state.completed_tasks.insert("A".into());
        state.in_progress_tasks.insert("A".into());
        let err = state.check_disjoint().unwrap_err();
        assert!(err.contains('A'));
    }
}
