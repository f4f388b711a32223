// src/exec/backend.rs

//! Pluggable launcher abstraction.
//!
//! The CLI hands the directives of a persisted wave to a `Launcher` instead
//! of spawning processes itself. This makes it easy to swap in a fake
//! launcher in tests while keeping the production implementation in
//! [`super::task_runner`].

use std::future::Future;
use std::io::Write;
use std::pin::Pin;

use serde::Serialize;
use tracing::info;

use crate::dag::LaunchDirective;
use crate::errors::Result;
use crate::types::TaskId;

/// What happened to each directive handed to a launcher.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchReport {
    pub launched: Vec<TaskId>,
    /// Directives without a command; a human has to start these.
    pub skipped: Vec<TaskId>,
    /// Spawn failures with the error message. The wave is not rolled back.
    pub failed: Vec<(TaskId, String)>,
}

impl LaunchReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Trait abstracting how launch directives are acted on.
pub trait Launcher: Send {
    /// Start (or announce) one worker per directive.
    ///
    /// Implementations must not wait for workers to finish.
    fn launch(
        &mut self,
        directives: Vec<LaunchDirective>,
    ) -> Pin<Box<dyn Future<Output = Result<LaunchReport>> + Send + '_>>;
}

/// Launcher that only prints what should be started.
///
/// Every directive counts as launched: the operator is the executor.
pub struct PrintLauncher<W: Write + Send> {
    out: W,
}

impl PrintLauncher<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self {
            out: std::io::stdout(),
        }
    }
}

impl<W: Write + Send> PrintLauncher<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> Launcher for PrintLauncher<W> {
    fn launch(
        &mut self,
        directives: Vec<LaunchDirective>,
    ) -> Pin<Box<dyn Future<Output = Result<LaunchReport>> + Send + '_>> {
        Box::pin(async move {
            let mut report = LaunchReport::default();
            for d in directives {
                writeln!(self.out, "{}", render_directive(&d))?;
                info!(task = %d.task_id, "printed launch directive");
                report.launched.push(d.task_id);
            }
            self.out.flush()?;
            Ok(report)
        })
    }
}

/// Multi-line, human-readable form of a directive.
pub fn render_directive(d: &LaunchDirective) -> String {
    let mut lines = vec![format!("• {} [{}] ({})", d.name, d.priority, d.task_id)];
    if !d.dependencies.is_empty() {
        lines.push(format!("    after: {}", d.dependencies.join(", ")));
    }
    lines.push(format!("    role: {}", d.role));
    lines.push(format!("    estimate: {}h", d.estimated_hours));
    match (&d.command, &d.prompt) {
        (Some(cmd), _) => lines.push(format!("    $ {cmd}")),
        (None, Some(prompt)) => {
            lines.push("    prompt:".to_string());
            lines.extend(prompt.lines().map(|l| format!("      {l}")));
        }
        (None, None) => lines.push("    (no command or prompt configured)".to_string()),
    }
    lines.join("\n")
}
