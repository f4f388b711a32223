// src/monitor/report.rs

use std::collections::BTreeSet;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::dag::completion::CompletionProbe;
use crate::dag::registry::TaskRegistry;
use crate::dag::resolver::{classify, TaskClass};
use crate::dag::task_info::{LaunchDirective, LaunchSettings, Task};
use crate::state::{reconcile_completions, RunState};
use crate::types::{Priority, TaskId};
use crate::workers::ActiveWorkerRecord;

/// Above this completion percentage the "nearly done" hint is shown.
const NEARLY_DONE_PERCENT: u32 = 80;

/// Everything besides the two stores that a report depends on.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub max_concurrent: usize,
    pub stuck_grace: Duration,
    pub launch: LaunchSettings,
    /// When set, tasks whose completion check holds are projected as done.
    pub probe: Option<CompletionProbe>,
}

impl ReportOptions {
    pub fn new(max_concurrent: usize, stuck_grace: Duration) -> Self {
        Self {
            max_concurrent,
            stuck_grace,
            launch: LaunchSettings::default(),
            probe: None,
        }
    }

    pub fn with_launch_settings(mut self, launch: LaunchSettings) -> Self {
        self.launch = launch;
        self
    }

    pub fn with_completion_probe(mut self, probe: CompletionProbe) -> Self {
        self.probe = Some(probe);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskLine {
    pub id: TaskId,
    pub name: String,
    pub priority: Priority,
    pub estimated_hours: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl TaskLine {
    fn from_task(task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            name: task.name.clone(),
            priority: task.priority,
            estimated_hours: task.estimated_hours,
            description: task.description.clone(),
        }
    }

    /// Line for an id the registry does not know (stale state or marker).
    fn unknown(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: id.to_string(),
            priority: Priority::default(),
            estimated_hours: 0.0,
            description: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveWorkerView {
    pub task_id: TaskId,
    pub name: String,
    pub role: String,
    pub start_time: DateTime<Utc>,
    pub elapsed_minutes: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadyTask {
    #[serde(flatten)]
    pub task: TaskLine,
    /// Command that would be launched for this task, if one is configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub launch_hint: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockedTask {
    #[serde(flatten)]
    pub task: TaskLine,
    pub missing: Vec<TaskId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StuckTask {
    #[serde(flatten)]
    pub task: TaskLine,
    /// Admission time, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_progress_since: Option<DateTime<Utc>>,
}

/// Read-only projection of the run state and the worker claims.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub generated_at: DateTime<Utc>,
    pub total: usize,
    /// Includes `detected_complete`.
    pub completed: usize,
    pub in_progress: usize,
    pub percent: u32,
    pub max_concurrent: usize,
    pub free_slots: usize,
    pub estimated_remaining_hours: u64,
    pub completed_tasks: Vec<TaskLine>,
    pub detected_complete: Vec<TaskId>,
    pub active_workers: Vec<ActiveWorkerView>,
    pub in_progress_tasks: Vec<TaskLine>,
    pub ready: Vec<ReadyTask>,
    pub blocked: Vec<BlockedTask>,
    pub stuck: Vec<StuckTask>,
    pub recommendations: Vec<String>,
}

impl StatusReport {
    /// Build a report. Never writes to either store: completion checks are
    /// applied to a private copy of `state`.
    pub fn build(
        registry: &TaskRegistry,
        state: &RunState,
        active: &[ActiveWorkerRecord],
        opts: &ReportOptions,
        now: DateTime<Utc>,
    ) -> Self {
        let active_ids: BTreeSet<TaskId> = active.iter().map(|r| r.task_id.clone()).collect();

        let mut projected = state.clone();
        let detected_complete = match opts.probe.as_ref() {
            Some(probe) => reconcile_completions(registry, &mut projected, &active_ids, probe),
            None => Vec::new(),
        };

        let line_for = |id: &str| {
            registry
                .get_task(id)
                .map(TaskLine::from_task)
                .unwrap_or_else(|| TaskLine::unknown(id))
        };

        let mut completed_tasks = Vec::new();
        let mut in_progress_tasks = Vec::new();
        let mut ready = Vec::new();
        let mut blocked = Vec::new();

        for (task, class) in classify(registry, &projected, &active_ids) {
            match class {
                TaskClass::Completed => completed_tasks.push(TaskLine::from_task(task)),
                TaskClass::InProgress => in_progress_tasks.push(TaskLine::from_task(task)),
                TaskClass::Claimed => {}
                TaskClass::Ready => ready.push(task),
                TaskClass::Blocked { missing } => blocked.push(BlockedTask {
                    task: TaskLine::from_task(task),
                    missing,
                }),
            }
        }
        ready.sort_by_key(|t| t.priority);

        let ready: Vec<ReadyTask> = ready
            .into_iter()
            .map(|task| ReadyTask {
                task: TaskLine::from_task(task),
                launch_hint: LaunchDirective::for_task(task, &opts.launch).command,
            })
            .collect();

        let active_workers: Vec<ActiveWorkerView> = active
            .iter()
            .map(|r| ActiveWorkerView {
                task_id: r.task_id.clone(),
                name: line_for(&r.task_id).name,
                role: r.role.clone(),
                start_time: r.start_time,
                elapsed_minutes: (now - r.start_time).num_minutes().max(0),
            })
            .collect();

        let stuck: Vec<StuckTask> = projected
            .in_progress_tasks
            .iter()
            .filter(|id| !active_ids.contains(*id) && !projected.is_completed(id))
            .filter_map(|id| {
                let since = projected.in_progress_since.get(id).copied();
                is_stuck(since, now, opts.stuck_grace).then(|| StuckTask {
                    task: line_for(id),
                    in_progress_since: since,
                })
            })
            .collect();

        let total = registry.len();
        let completed = registry
            .all_tasks()
            .iter()
            .filter(|t| projected.is_completed(&t.id))
            .count();
        let percent = percent_complete(completed, total);
        let free_slots = opts.max_concurrent.saturating_sub(active.len());
        let ready_hours: f64 = ready.iter().map(|r| r.task.estimated_hours).sum();
        let estimated_remaining_hours = estimate_hours(ready_hours, opts.max_concurrent);

        let mut report = Self {
            generated_at: now,
            total,
            completed,
            in_progress: in_progress_tasks.len(),
            percent,
            max_concurrent: opts.max_concurrent,
            free_slots,
            estimated_remaining_hours,
            completed_tasks,
            detected_complete,
            active_workers,
            in_progress_tasks,
            ready,
            blocked,
            stuck,
            recommendations: Vec::new(),
        };
        report.recommendations = recommendations(&report);
        report
    }

    pub fn all_complete(&self) -> bool {
        self.total > 0 && self.completed == self.total
    }
}

/// In progress without a claim counts as stuck once the grace period has
/// passed. Without an admission time there is nothing to wait for.
fn is_stuck(since: Option<DateTime<Utc>>, now: DateTime<Utc>, grace: Duration) -> bool {
    match since {
        None => true,
        Some(since) => match chrono::Duration::from_std(grace) {
            Ok(grace) => now - since > grace,
            Err(_) => false,
        },
    }
}

fn percent_complete(completed: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((completed as f64 * 100.0) / total as f64).round() as u32
}

fn estimate_hours(ready_hours: f64, max_concurrent: usize) -> u64 {
    (ready_hours / max_concurrent.max(1) as f64).ceil().max(0.0) as u64
}

fn recommendations(report: &StatusReport) -> Vec<String> {
    let mut out = Vec::new();

    if report.all_complete() {
        out.push("All tasks completed".to_string());
        return out;
    }

    if report.free_slots > 0 && !report.ready.is_empty() {
        let n = report.free_slots.min(report.ready.len());
        out.push(format!("You can start {n} more worker(s) in parallel"));
    }
    if report
        .ready
        .iter()
        .any(|r| r.task.priority == Priority::Critical)
    {
        out.push("Critical tasks are ready; prioritize these".to_string());
    }
    if report.percent > NEARLY_DONE_PERCENT && !report.ready.is_empty() {
        out.push("Nearly done; dispatch the remaining tasks to finish".to_string());
    }
    if !report.stuck.is_empty() {
        out.push(format!(
            "{} task(s) in progress without a worker; use `taskwave reset` or `taskwave mark <TASK> completed`",
            report.stuck.len()
        ));
    }
    if !report.detected_complete.is_empty() {
        out.push(format!(
            "{} task(s) look finished; the next wave will record them",
            report.detected_complete.len()
        ));
    }

    out
}
