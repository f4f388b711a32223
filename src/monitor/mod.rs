// src/monitor/mod.rs

//! Read-only status dashboard.
//!
//! - [`report`] builds a [`StatusReport`] from the run state and the worker
//!   claims.
//! - [`render`] turns it into text or JSON.
//!
//! Nothing in this module writes to the state store or the worker registry.

pub mod render;
pub mod report;

use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info};

use crate::dag::TaskRegistry;
use crate::errors::Result;
use crate::state::StateStore;
use crate::workers::ActiveWorkers;

pub use render::{progress_bar, render_json, render_text};
pub use report::{ReportOptions, StatusReport};

/// Load both stores and build a report for the current instant.
pub fn snapshot(
    registry: &TaskRegistry,
    store: &dyn StateStore,
    workers: &dyn ActiveWorkers,
    opts: &ReportOptions,
) -> Result<StatusReport> {
    let state = store.load()?;
    let active = workers.list_active()?;
    let report = StatusReport::build(registry, &state, &active, opts, Utc::now());
    debug!(
        completed = report.completed,
        total = report.total,
        stuck = report.stuck.len(),
        "built status report"
    );
    Ok(report)
}

/// Call `refresh` immediately and then every `interval` until Ctrl-C.
///
/// An error from `refresh` ends the loop and is returned.
pub async fn watch<F>(interval: Duration, mut refresh: F) -> Result<()>
where
    F: FnMut() -> Result<()>,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = ticker.tick() => refresh()?,
            res = &mut ctrl_c => {
                res?;
                info!("monitoring stopped");
                return Ok(());
            }
        }
    }
}
