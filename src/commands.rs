// src/commands.rs

//! One function per CLI subcommand.
//!
//! Each takes the loaded [`Project`] and a writer for stdout, so the same
//! code paths run in the binary and in tests.

use std::io::Write;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::validate::is_valid_task_id;
use crate::dag::{WaveOutcome, WaveStatus};
use crate::errors::{Result, TaskwaveError};
use crate::exec::{LaunchReport, Launcher};
use crate::monitor::{self, render_json, render_text};
use crate::project::Project;
use crate::state::StateStore;
use crate::workers::{ActiveWorkerRecord, ActiveWorkers};

/// Result of `taskwave wave`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WaveRun {
    pub outcome: WaveOutcome,
    /// `None` for dry runs and when directives were only emitted as JSON.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub launch: Option<LaunchReport>,
}

/// Run (or preview) one wave and hand the directives to `launcher`.
pub async fn wave(
    project: &Project,
    max_concurrent: usize,
    dry_run: bool,
    launcher: Option<&mut dyn Launcher>,
    json: bool,
    out: &mut dyn Write,
) -> Result<WaveRun> {
    let scheduler = project.scheduler();
    let outcome = if dry_run {
        scheduler.preview_wave(max_concurrent)?
    } else {
        scheduler.schedule_wave(max_concurrent)?
    };

    let launch = match launcher {
        Some(launcher) if !dry_run && !outcome.launched.is_empty() => {
            let report = launcher.launch(outcome.launched.clone()).await?;
            for (task, reason) in &report.failed {
                warn!(
                    task = %task,
                    reason = %reason,
                    "launch failed; the task stays in progress until reset or released"
                );
            }
            Some(report)
        }
        _ => None,
    };

    let run = WaveRun { outcome, launch };
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&run)?)?;
    } else {
        write_wave_text(out, &run, project.registry.len())?;
    }
    Ok(run)
}

fn write_wave_text(out: &mut dyn Write, run: &WaveRun, total: usize) -> std::io::Result<()> {
    let o = &run.outcome;
    let prefix = if o.dry_run { "[dry run] " } else { "" };

    if !o.reconciled.is_empty() {
        writeln!(
            out,
            "{prefix}recorded as completed (done_when satisfied): {}",
            o.reconciled.join(", ")
        )?;
    }

    match o.status {
        WaveStatus::Launched => writeln!(
            out,
            "{prefix}wave: {} task(s) selected ({} active before, max {})",
            o.launched.len(),
            o.active_before,
            o.max_concurrent
        )?,
        WaveStatus::AtCapacity => writeln!(
            out,
            "{prefix}at capacity: {}/{} workers active; nothing launched",
            o.active_before, o.max_concurrent
        )?,
        WaveStatus::NothingReady => writeln!(
            out,
            "{prefix}nothing ready: waiting on running workers or unfinished dependencies"
        )?,
        WaveStatus::AllComplete => writeln!(out, "{prefix}all {total} tasks completed")?,
    }

    // The print launcher already showed full directives.
    if run.launch.is_none() {
        for d in &o.launched {
            writeln!(out, "  • {} [{}] ({})", d.name, d.priority, d.task_id)?;
        }
    }

    if let Some(report) = &run.launch {
        for id in &report.skipped {
            writeln!(out, "  no command for '{id}'; start it by hand")?;
        }
        for (id, reason) in &report.failed {
            writeln!(out, "  failed to launch '{id}': {reason}")?;
        }
    }

    if !o.next_wave.is_empty() {
        writeln!(out, "next wave: {}", o.next_wave.join(", "))?;
    }
    Ok(())
}

/// Print one status report.
pub fn status(
    project: &Project,
    max_concurrent: usize,
    json: bool,
    out: &mut dyn Write,
) -> Result<()> {
    let opts = project.report_options(max_concurrent);
    let report = monitor::snapshot(&project.registry, &project.store, &project.workers, &opts)?;
    if json {
        writeln!(out, "{}", render_json(&report)?)?;
    } else {
        write!(out, "{}", render_text(&report))?;
    }
    Ok(())
}

/// `mark <TASK> in-progress`: admit the task and claim a slot.
pub fn mark_in_progress(
    project: &Project,
    task_id: &str,
    role: Option<&str>,
    out: &mut dyn Write,
) -> Result<()> {
    let task = project.registry.task(task_id)?;
    project.store.mark_in_progress(&project.registry, task_id)?;

    // An existing claim keeps its start time.
    if project.workers.active_task_ids()?.contains(task_id) {
        info!(task = %task_id, "task already claimed; keeping existing claim");
    } else {
        let role = role.map(str::to_string).unwrap_or_else(|| task.role.clone());
        let record = ActiveWorkerRecord::new(task.id.clone(), role, Utc::now())
            .with_prompt(task.prompt.clone());
        project.workers.claim(&record)?;
    }

    writeln!(out, "{task_id}: in progress")?;
    Ok(())
}

/// `mark <TASK> completed`: record completion and release the claim.
pub fn mark_completed(project: &Project, task_id: &str, out: &mut dyn Write) -> Result<()> {
    project.store.mark_completed(&project.registry, task_id)?;
    project.workers.release(task_id)?;
    writeln!(out, "{task_id}: completed")?;
    Ok(())
}

/// Remove a worker claim only.
///
/// Works for ids that are no longer configured, so a claim left behind by a
/// removed task can still free its slot.
pub fn release(project: &Project, task_id: &str, out: &mut dyn Write) -> Result<()> {
    if !project.registry.contains(task_id) {
        if !is_valid_task_id(task_id) {
            return Err(TaskwaveError::TaskNotFound(task_id.to_string()));
        }
        warn!(task = %task_id, "releasing a claim for a task that is not in the registry");
    }
    if project.workers.release(task_id)? {
        writeln!(out, "{task_id}: claim released")?;
    } else {
        writeln!(out, "{task_id}: no active claim")?;
    }
    Ok(())
}

/// Operator recovery: in-progress back to unseen, claim released.
pub fn reset(project: &Project, task_id: &str, out: &mut dyn Write) -> Result<()> {
    let changed = project.store.reset(&project.registry, task_id)?;
    let released = project.workers.release(task_id)?;
    info!(task = %task_id, changed, released, "reset requested");

    if changed || released {
        writeln!(out, "{task_id}: reset")?;
    } else {
        writeln!(out, "{task_id}: was not in progress")?;
    }
    Ok(())
}

/// List tasks in dependency order.
pub fn validate(project: &Project, out: &mut dyn Write) -> Result<()> {
    let cfg = &project.config.config;
    writeln!(out, "taskwave: config OK")?;
    writeln!(out, "  max_concurrent = {}", cfg.max_concurrent)?;
    writeln!(out, "  state_file = {}", project.paths.state_file.display())?;
    writeln!(out, "  marker_dir = {}", project.paths.marker_dir.display())?;
    writeln!(out, "  stuck_grace = {}", cfg.stuck_grace)?;
    writeln!(out)?;

    let settings = project.launch_settings();
    writeln!(out, "tasks ({}), in dependency order:", project.registry.len())?;
    for task in project.registry.topological_order() {
        writeln!(out, "  - {} [{}] {}h", task.id, task.priority, task.estimated_hours)?;
        if task.name != task.id {
            writeln!(out, "      name: {}", task.name)?;
        }
        if !task.dependencies.is_empty() {
            writeln!(out, "      after: {}", task.dependencies.join(", "))?;
        }
        let directive = crate::dag::LaunchDirective::for_task(task, &settings);
        if let Some(cmd) = directive.command {
            writeln!(out, "      cmd: {cmd}")?;
        }
        if task.completion.is_some() {
            writeln!(out, "      done_when: configured")?;
        }
    }
    Ok(())
}
