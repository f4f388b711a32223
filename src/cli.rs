// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::loader::DEFAULT_CONFIG_FILE;

/// Command-line arguments for `taskwave`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "taskwave",
    version,
    about = "Dispatch dependency-ordered tasks to parallel workers in bounded waves.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Taskwave.toml` in the current working directory.
    #[arg(long, global = true, value_name = "PATH", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `TASKWAVE_LOG` or a default level will be used.
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run one scheduling wave and launch the selected tasks.
    Wave(WaveArgs),

    /// Show progress, active workers, ready and stuck tasks.
    Status(StatusArgs),

    /// Report a worker lifecycle transition for a task.
    Mark(MarkArgs),

    /// Remove a task's worker claim without touching the run state.
    Release {
        /// Task id.
        task: String,
    },

    /// Return an in-progress task to unseen and release its claim.
    Reset {
        /// Task id.
        task: String,
    },

    /// Parse + validate the config and print tasks in dependency order.
    Validate,
}

#[derive(Debug, Clone, Args)]
pub struct WaveArgs {
    /// Maximum simultaneously active workers. Overrides `[config].max_concurrent`.
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
    pub max_concurrent: Option<u64>,

    /// Compute the wave without saving state, claiming or launching.
    #[arg(long)]
    pub dry_run: bool,

    /// How selected tasks are started.
    #[arg(long, value_enum, default_value_t = LauncherKind::Print)]
    pub launcher: LauncherKind,

    /// Print the wave outcome as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Args)]
pub struct StatusArgs {
    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,

    /// Keep refreshing until Ctrl-C.
    #[arg(long)]
    pub watch: bool,

    /// Refresh interval for `--watch`, in seconds.
    #[arg(long, value_name = "SECS", default_value_t = 5, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: u64,

    /// Capacity used for free-slot and time estimates. Overrides `[config].max_concurrent`.
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
    pub max_concurrent: Option<u64>,
}

#[derive(Debug, Clone, Args)]
pub struct MarkArgs {
    /// Task id.
    pub task: String,

    /// New status.
    #[arg(value_enum)]
    pub status: MarkStatus,

    /// Role recorded in the worker claim (default: the task's role).
    #[arg(long, value_name = "ROLE")]
    pub role: Option<String>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum MarkStatus {
    /// Admit the task and claim a worker slot.
    InProgress,
    /// Record completion and release the claim.
    Completed,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum LauncherKind {
    /// Print directives for a human or an outer tool.
    Print,
    /// Spawn each command detached with `sh -c`.
    Shell,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
