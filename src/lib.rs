// src/lib.rs

pub mod cli;
pub mod commands;
pub mod config;
pub mod dag;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod monitor;
pub mod project;
pub mod state;
pub mod types;
pub mod workers;

use std::io::Write;
use std::time::Duration;

use tracing::debug;

use crate::cli::{CliArgs, Command, LauncherKind, MarkStatus};
use crate::errors::Result;
use crate::exec::{Launcher, PrintLauncher, ShellLauncher};

pub use crate::project::Project;

/// Clears the terminal and homes the cursor between `--watch` refreshes.
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// High-level entry point used by `main.rs`.
///
/// Loads and validates the config (fatal on unknown dependencies or cycles),
/// then runs exactly one subcommand to completion.
pub async fn run(args: CliArgs) -> Result<()> {
    let project = Project::load(&args.config)?;
    debug!(config = ?args.config, command = ?args.command, "dispatching command");

    let mut out = std::io::stdout();

    match args.command {
        Command::Wave(w) => {
            let max = project.max_concurrent(w.max_concurrent);

            let mut print = PrintLauncher::stdout();
            let mut shell = ShellLauncher::new(project.paths.root.clone())
                .with_log_dir(project.paths.marker_dir.join("logs"));

            // With --json the directives are part of the JSON document, so
            // the print launcher would only corrupt stdout.
            let launcher: Option<&mut dyn Launcher> = match (w.launcher, w.json) {
                (LauncherKind::Print, true) => None,
                (LauncherKind::Print, false) => Some(&mut print),
                (LauncherKind::Shell, _) => Some(&mut shell),
            };

            commands::wave(
                &project,
                max,
                w.dry_run,
                launcher,
                w.json,
                &mut out,
            )
            .await?;
        }
        Command::Status(s) => {
            let max = project.max_concurrent(s.max_concurrent);
            if s.watch {
                monitor::watch(Duration::from_secs(s.interval), || {
                    if !s.json {
                        write!(out, "{CLEAR_SCREEN}")?;
                    }
                    commands::status(&project, max, s.json, &mut out)?;
                    out.flush()?;
                    Ok(())
                })
                .await?;
            } else {
                commands::status(&project, max, s.json, &mut out)?;
            }
        }
        Command::Mark(m) => match m.status {
            MarkStatus::InProgress => {
                commands::mark_in_progress(&project, &m.task, m.role.as_deref(), &mut out)?
            }
            MarkStatus::Completed => commands::mark_completed(&project, &m.task, &mut out)?,
        },
        Command::Release { task } => commands::release(&project, &task, &mut out)?,
        Command::Reset { task } => commands::reset(&project, &task, &mut out)?,
        Command::Validate => commands::validate(&project, &mut out)?,
    }

    out.flush()?;
    Ok(())
}
