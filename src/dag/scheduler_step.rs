// src/dag/scheduler_step.rs

//! Result types for a single scheduling wave.

use serde::Serialize;

use crate::dag::task_info::LaunchDirective;
use crate::types::TaskId;

/// Why a wave did or did not launch anything.
///
/// Only `Launched` has side effects. `AtCapacity` and `NothingReady` are
/// distinct so operators can tell "waiting on workers" from "waiting on
/// dependencies"; neither is an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WaveStatus {
    Launched,
    AtCapacity,
    NothingReady,
    AllComplete,
}

/// Structured result of one wave.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WaveOutcome {
    pub status: WaveStatus,
    /// Directives for the tasks admitted in this wave, in selection order.
    pub launched: Vec<LaunchDirective>,
    /// Ready tasks that did not fit into the free slots.
    pub next_wave: Vec<TaskId>,
    /// Tasks recorded as completed because their completion check held.
    pub reconciled: Vec<TaskId>,
    /// Worker claims that existed before the wave.
    pub active_before: usize,
    pub free_slots: usize,
    pub max_concurrent: usize,
    /// `true` when computed without persisting anything.
    pub dry_run: bool,
}

impl WaveOutcome {
    pub fn launched_ids(&self) -> Vec<&str> {
        self.launched.iter().map(|d| d.task_id.as_str()).collect()
    }
}
