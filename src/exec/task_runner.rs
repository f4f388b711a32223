// src/exec/task_runner.rs

//! Detached shell launcher used in production.

use std::fs::{self, File};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::process::Stdio;

use anyhow::Context;
use tokio::process::Command;
use tracing::{info, warn};

use crate::dag::LaunchDirective;
use crate::errors::Result;

use super::backend::{LaunchReport, Launcher};

/// Environment variable carrying the task id into the worker.
pub const TASK_ID_ENV: &str = "TASKWAVE_TASK_ID";
/// Environment variable carrying the worker role.
pub const ROLE_ENV: &str = "TASKWAVE_ROLE";

/// Spawns each directive's command with `sh -c` and never waits for it.
///
/// The worker reports back through `taskwave mark`; the launcher keeps no
/// handle on the child process.
#[derive(Debug, Clone)]
pub struct ShellLauncher {
    workdir: PathBuf,
    log_dir: Option<PathBuf>,
}

impl ShellLauncher {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
            log_dir: None,
        }
    }

    /// Redirect each worker's stdout and stderr to `<dir>/<task_id>.log`.
    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(dir.into());
        self
    }

    fn spawn_one(&self, d: &LaunchDirective, cmd_line: &str) -> anyhow::Result<Option<u32>> {
        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(cmd_line)
            .current_dir(&self.workdir)
            .env(TASK_ID_ENV, &d.task_id)
            .env(ROLE_ENV, &d.role)
            .stdin(Stdio::null());

        match &self.log_dir {
            Some(dir) => {
                let (stdout, stderr) = log_files(dir, &d.task_id)?;
                cmd.stdout(stdout).stderr(stderr);
            }
            None => {
                cmd.stdout(Stdio::null()).stderr(Stdio::null());
            }
        }

        // Own process group, so Ctrl-C in the scheduler's terminal does not
        // reach the workers.
        #[cfg(unix)]
        cmd.process_group(0);

        let child = cmd
            .spawn()
            .with_context(|| format!("spawning worker for task '{}'", d.task_id))?;
        Ok(child.id())
    }
}

fn log_files(dir: &Path, task_id: &str) -> anyhow::Result<(File, File)> {
    fs::create_dir_all(dir)
        .with_context(|| format!("creating worker log directory {}", dir.display()))?;
    let path = dir.join(format!("{task_id}.log"));
    let stdout = File::create(&path)
        .with_context(|| format!("creating worker log {}", path.display()))?;
    let stderr = stdout
        .try_clone()
        .with_context(|| format!("duplicating handle for {}", path.display()))?;
    Ok((stdout, stderr))
}

impl Launcher for ShellLauncher {
    fn launch(
        &mut self,
        directives: Vec<LaunchDirective>,
    ) -> Pin<Box<dyn Future<Output = Result<LaunchReport>> + Send + '_>> {
        Box::pin(async move {
            let mut report = LaunchReport::default();

            for d in directives {
                let Some(cmd_line) = d.command.as_deref() else {
                    warn!(
                        task = %d.task_id,
                        "no cmd or launch_template configured; start this worker by hand"
                    );
                    report.skipped.push(d.task_id);
                    continue;
                };

                match self.spawn_one(&d, cmd_line) {
                    Ok(pid) => {
                        info!(task = %d.task_id, role = %d.role, pid, "worker process spawned");
                        report.launched.push(d.task_id);
                    }
                    Err(e) => {
                        warn!(task = %d.task_id, error = %format!("{e:#}"), "failed to spawn worker");
                        report.failed.push((d.task_id, format!("{e:#}")));
                    }
                }
            }

            Ok(report)
        })
    }
}
