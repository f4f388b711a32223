// src/monitor/render.rs

use std::fmt::Write;

use crate::errors::Result;
use crate::monitor::report::StatusReport;

const BAR_WIDTH: usize = 20;

/// Fixed-width progress bar, one cell per 5%.
pub fn progress_bar(percent: u32) -> String {
    let filled = ((percent.min(100) / 5) as usize).min(BAR_WIDTH);
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

pub fn render_json(report: &StatusReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Human-readable dashboard.
pub fn render_text(report: &StatusReport) -> String {
    let mut out = String::new();

    // Writing into a String cannot fail.
    let _ = write_text(&mut out, report);
    out
}

fn write_text(out: &mut String, r: &StatusReport) -> std::fmt::Result {
    writeln!(out, "taskwave status ({})", r.generated_at.format("%Y-%m-%d %H:%M:%S UTC"))?;
    writeln!(out)?;
    writeln!(out, "Overall progress:")?;
    writeln!(
        out,
        "[{}] {}% ({}/{} tasks)",
        progress_bar(r.percent),
        r.percent,
        r.completed,
        r.total
    )?;
    writeln!(out)?;

    writeln!(
        out,
        "Active workers ({}/{}):",
        r.active_workers.len(),
        r.max_concurrent
    )?;
    if r.active_workers.is_empty() {
        writeln!(out, "   none running")?;
    }
    for w in &r.active_workers {
        writeln!(out, "   • {} - {} ({} min)", w.role, w.name, w.elapsed_minutes)?;
    }
    writeln!(out)?;

    writeln!(out, "Completed:")?;
    if r.completed_tasks.is_empty() {
        writeln!(out, "   none yet")?;
    }
    for t in &r.completed_tasks {
        if r.detected_complete.contains(&t.id) {
            writeln!(out, "   • {} (detected, not yet recorded)", t.name)?;
        } else {
            writeln!(out, "   • {}", t.name)?;
        }
    }
    writeln!(out)?;

    writeln!(out, "In progress:")?;
    if r.in_progress_tasks.is_empty() {
        writeln!(out, "   none")?;
    }
    for t in &r.in_progress_tasks {
        writeln!(out, "   • {} - {}h", t.name, t.estimated_hours)?;
    }
    writeln!(out)?;

    writeln!(out, "Ready (dependencies met):")?;
    if r.ready.is_empty() {
        writeln!(out, "   no tasks ready")?;
    }
    for t in &r.ready {
        writeln!(
            out,
            "   • {} [{}] - {}h",
            t.task.name, t.task.priority, t.task.estimated_hours
        )?;
        if let Some(desc) = &t.task.description {
            writeln!(out, "     {desc}")?;
        }
        if let Some(hint) = &t.launch_hint {
            writeln!(out, "     $ {hint}")?;
        }
    }
    writeln!(out)?;

    if !r.blocked.is_empty() {
        writeln!(out, "Blocked:")?;
        for b in &r.blocked {
            writeln!(out, "   • {} (waiting on {})", b.task.name, b.missing.join(", "))?;
        }
        writeln!(out)?;
    }

    if !r.stuck.is_empty() {
        writeln!(out, "Stuck (in progress, no worker):")?;
        for s in &r.stuck {
            match s.in_progress_since {
                Some(since) => writeln!(
                    out,
                    "   • {} (since {})",
                    s.task.name,
                    since.format("%Y-%m-%d %H:%M UTC")
                )?,
                None => writeln!(out, "   • {} (no start time recorded)", s.task.name)?,
            }
        }
        writeln!(out)?;
    }

    writeln!(out, "Recommendations:")?;
    if r.recommendations.is_empty() {
        writeln!(out, "   none")?;
    }
    for rec in &r.recommendations {
        writeln!(out, "   • {rec}")?;
    }
    writeln!(out)?;

    writeln!(
        out,
        "Estimated time remaining: {}h (with {} parallel workers)",
        r.estimated_remaining_hours, r.max_concurrent
    )?;
    Ok(())
}
