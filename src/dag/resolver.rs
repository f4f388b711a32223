// src/dag/resolver.rs

//! Readiness resolution: which tasks may start now.

use std::collections::BTreeSet;

use crate::dag::registry::TaskRegistry;
use crate::dag::task_info::Task;
use crate::state::RunState;
use crate::types::TaskId;

/// Where a task stands, derived from the run state and the worker claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskClass {
    Completed,
    /// Listed as in progress in the run state (claimed or not).
    InProgress,
    /// Holds a worker claim but is not recorded in the run state.
    Claimed,
    Ready,
    /// Waiting on the listed dependencies.
    Blocked { missing: Vec<TaskId> },
}

/// Tasks that can start now, most urgent first.
///
/// A task is ready iff it is not completed, not in progress, not claimed,
/// and every dependency is completed. The result is sorted by priority with
/// ties broken by declaration order, so identical inputs always give
/// identical output.
pub fn compute_ready<'a>(
    registry: &'a TaskRegistry,
    state: &RunState,
    active: &BTreeSet<TaskId>,
) -> Vec<&'a Task> {
    let mut ready: Vec<&Task> = registry
        .all_tasks()
        .iter()
        .filter(|t| classify_task(t, state, active) == TaskClass::Ready)
        .collect();

    // Stable sort keeps declaration order within a priority class.
    ready.sort_by_key(|t| t.priority);
    ready
}

/// Classify a single task.
///
/// Completion is terminal: a completed id that also appears in progress
/// (which a loaded state never allows, but in-memory callers might) still
/// classifies as completed.
pub fn classify_task(task: &Task, state: &RunState, active: &BTreeSet<TaskId>) -> TaskClass {
    if state.is_completed(&task.id) {
        return TaskClass::Completed;
    }
    if state.is_in_progress(&task.id) {
        return TaskClass::InProgress;
    }
    if active.contains(&task.id) {
        return TaskClass::Claimed;
    }

    let missing = state.missing_dependencies(task);
    if missing.is_empty() {
        TaskClass::Ready
    } else {
        TaskClass::Blocked { missing }
    }
}

/// Classify every task, in declaration order.
pub fn classify<'a>(
    registry: &'a TaskRegistry,
    state: &RunState,
    active: &BTreeSet<TaskId>,
) -> Vec<(&'a Task, TaskClass)> {
    registry
        .all_tasks()
        .iter()
        .map(|t| (t, classify_task(t, state, active)))
        .collect()
}
