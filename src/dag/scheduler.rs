// src/dag/scheduler.rs

use std::collections::BTreeSet;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::dag::completion::CompletionProbe;
use crate::dag::registry::TaskRegistry;
use crate::dag::resolver::{classify, compute_ready, TaskClass};
use crate::dag::scheduler_step::{WaveOutcome, WaveStatus};
use crate::dag::task_info::{LaunchDirective, LaunchSettings};
use crate::errors::Result;
use crate::state::{reconcile_completions, RunState, StateStore, StateSummary};
use crate::types::TaskId;
use crate::workers::{ActiveWorkerRecord, ActiveWorkers};

/// Bounded-concurrency wave dispatcher.
///
/// Each call to [`schedule_wave`](Self::schedule_wave):
/// - loads the run state and scans worker claims
/// - records externally finished tasks (if a completion probe is set)
/// - fills the free slots (`max_concurrent - claims`) with ready tasks,
///   most urgent first
/// - persists the admissions, creates a claim per admitted task and returns
///   one [`LaunchDirective`] per task
///
/// It never starts processes; the caller hands the directives to a
/// [`crate::exec::Launcher`].
pub struct WaveScheduler<'a> {
    registry: &'a TaskRegistry,
    store: &'a dyn StateStore,
    workers: &'a dyn ActiveWorkers,
    probe: Option<CompletionProbe>,
    launch: LaunchSettings,
}

impl<'a> WaveScheduler<'a> {
    pub fn new(
        registry: &'a TaskRegistry,
        store: &'a dyn StateStore,
        workers: &'a dyn ActiveWorkers,
    ) -> Self {
        Self {
            registry,
            store,
            workers,
            probe: None,
            launch: LaunchSettings::default(),
        }
    }

    /// Evaluate `done_when` checks through `probe` at the start of each wave.
    pub fn with_completion_probe(mut self, probe: CompletionProbe) -> Self {
        self.probe = Some(probe);
        self
    }

    pub fn with_launch_settings(mut self, launch: LaunchSettings) -> Self {
        self.launch = launch;
        self
    }

    /// Run one wave, persisting admissions and claims.
    pub fn schedule_wave(&self, max_concurrent: usize) -> Result<WaveOutcome> {
        self.run_wave(max_concurrent, true)
    }

    /// Compute what [`schedule_wave`](Self::schedule_wave) would do without
    /// writing anything.
    pub fn preview_wave(&self, max_concurrent: usize) -> Result<WaveOutcome> {
        self.run_wave(max_concurrent, false)
    }

    fn run_wave(&self, max_concurrent: usize, commit: bool) -> Result<WaveOutcome> {
        let mut state = self.store.load()?;
        self.warn_unknown_ids(&state);

        let active = self.workers.active_task_ids()?;
        let active_before = active.len();

        let reconciled = match self.probe.as_ref() {
            Some(probe) => reconcile_completions(self.registry, &mut state, &active, probe),
            None => Vec::new(),
        };

        let free_slots = max_concurrent.saturating_sub(active_before);
        let ready = compute_ready(self.registry, &state, &active);
        debug!(
            max_concurrent,
            active = active_before,
            free_slots,
            ready = ready.len(),
            "wave inputs"
        );

        let mut outcome = WaveOutcome {
            status: WaveStatus::Launched,
            launched: Vec::new(),
            next_wave: Vec::new(),
            reconciled,
            active_before,
            free_slots,
            max_concurrent,
            dry_run: !commit,
        };

        if free_slots == 0 || ready.is_empty() {
            outcome.status = if free_slots == 0 {
                info!(max_concurrent, active = active_before, "at capacity; no slots free");
                WaveStatus::AtCapacity
            } else if self
                .registry
                .all_tasks()
                .iter()
                .all(|t| state.is_completed(&t.id))
            {
                info!("all tasks completed");
                WaveStatus::AllComplete
            } else {
                info!("no tasks ready; waiting on dependencies or running workers");
                WaveStatus::NothingReady
            };
            outcome.next_wave = ready.iter().map(|t| t.id.clone()).collect();

            if commit && !outcome.reconciled.is_empty() {
                let summary = self.summary(&state, &active, &outcome.next_wave);
                self.store.save_with_summary(&state, Some(&summary))?;
            }
            return Ok(outcome);
        }

        let take = free_slots.min(ready.len());
        let (selected, rest) = ready.split_at(take);

        let now = Utc::now();
        for task in selected {
            state.admit(task, now)?;
        }
        outcome.next_wave = rest.iter().map(|t| t.id.clone()).collect();

        if commit {
            let summary = self.summary(&state, &active, &outcome.next_wave);
            self.store.save_with_summary(&state, Some(&summary))?;

            for task in selected {
                let record = ActiveWorkerRecord::new(task.id.clone(), task.role.clone(), now)
                    .with_prompt(task.prompt.clone());
                self.workers.claim(&record)?;
            }
        }

        for task in selected {
            info!(
                task = %task.id,
                priority = %task.priority,
                dry_run = !commit,
                "admitting task in this wave"
            );
            outcome
                .launched
                .push(LaunchDirective::for_task(task, &self.launch));
        }

        Ok(outcome)
    }

    fn summary(
        &self,
        state: &RunState,
        active: &BTreeSet<TaskId>,
        ready: &[TaskId],
    ) -> StateSummary {
        let blocked_tasks = classify(self.registry, state, active)
            .into_iter()
            .filter(|(_, class)| matches!(class, TaskClass::Blocked { .. }))
            .count();
        StateSummary {
            total_tasks: self.registry.len(),
            ready_tasks: ready.to_vec(),
            blocked_tasks,
        }
    }

    fn warn_unknown_ids(&self, state: &RunState) {
        for id in state
            .completed_tasks
            .iter()
            .chain(state.in_progress_tasks.iter())
        {
            if !self.registry.contains(id) {
                warn!(task = %id, "run state mentions a task that is not in the registry");
            }
        }
    }
}
