// src/config/model.rs

use std::time::Duration;

use serde::Deserialize;

use crate::types::{Priority, TaskId};

/// Top-level configuration as read from a TOML file, before validation.
///
/// ```toml
/// [config]
/// max_concurrent = 4
/// stuck_grace = "30m"
///
/// [[task]]
/// id = "design-system"
/// priority = "critical"
/// estimated_hours = 3
///
/// [[task]]
/// id = "logo-assets"
/// after = ["design-system"]
/// ```
///
/// Tasks are an array of tables so that declaration order survives
/// deserialization; that order is the secondary tie-break when scheduling.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigFile {
    /// Global behaviour config from `[config]`.
    #[serde(default)]
    pub config: ConfigSection,

    /// All tasks from `[[task]]`, in declaration order.
    #[serde(default)]
    pub task: Vec<TaskConfig>,
}

/// Validated configuration.
///
/// Constructed only through `TryFrom<RawConfigFile>` (see `validate.rs`), so
/// holders of a `ConfigFile` can rely on:
/// - at least one task, unique well-formed ids
/// - every `after` reference resolving to a declared task
/// - an acyclic dependency graph
/// - parseable `stuck_grace` and `done_when` patterns
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub config: ConfigSection,
    pub task: Vec<TaskConfig>,
    /// Parsed form of `config.stuck_grace`.
    pub stuck_grace: Duration,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        config: ConfigSection,
        task: Vec<TaskConfig>,
        stuck_grace: Duration,
    ) -> Self {
        Self {
            config,
            task,
            stuck_grace,
        }
    }
}

/// `[config]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigSection {
    /// Maximum number of simultaneously claimed workers.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    /// State document path, relative to the project root.
    #[serde(default = "default_state_file")]
    pub state_file: String,

    /// Directory holding one marker file per active worker.
    #[serde(default = "default_marker_dir")]
    pub marker_dir: String,

    /// How long a task may sit in progress without a worker claim before the
    /// monitor reports it as stuck (e.g. `"30m"`).
    #[serde(default = "default_stuck_grace")]
    pub stuck_grace: String,

    /// Command template used for tasks without an explicit `cmd`.
    ///
    /// Placeholders: `{id}`, `{name}`, `{role}`, `{prompt}`, `{root}`.
    /// `{prompt}` is substituted shell-quoted.
    #[serde(default)]
    pub launch_template: Option<String>,
}

fn default_max_concurrent() -> usize {
    4
}

fn default_state_file() -> String {
    ".taskwave/state.json".to_string()
}

fn default_marker_dir() -> String {
    ".taskwave/active".to_string()
}

fn default_stuck_grace() -> String {
    "30m".to_string()
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            max_concurrent: default_max_concurrent(),
            state_file: default_state_file(),
            marker_dir: default_marker_dir(),
            stuck_grace: default_stuck_grace(),
            launch_template: None,
        }
    }
}

/// `[[task]]` entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskConfig {
    /// Unique identifier; also used as the worker marker file stem.
    pub id: TaskId,

    /// Display label. Defaults to the id.
    #[serde(default)]
    pub name: Option<String>,

    /// Short description shown by the monitor.
    #[serde(default)]
    pub description: Option<String>,

    /// Dependency list: this task waits until all of these are completed.
    #[serde(default)]
    pub after: Vec<TaskId>,

    #[serde(default)]
    pub priority: Priority,

    #[serde(default = "default_estimated_hours")]
    pub estimated_hours: f64,

    /// Instructions handed to the agent working on this task.
    #[serde(default)]
    pub prompt: Option<String>,

    /// Explicit launch command. Overrides `[config].launch_template`.
    #[serde(default)]
    pub cmd: Option<String>,

    /// Worker role recorded in the claim. Defaults to the id.
    #[serde(default)]
    pub role: Option<String>,

    /// Predicate recognising the task as already done.
    #[serde(default)]
    pub done_when: Option<DoneWhenConfig>,
}

fn default_estimated_hours() -> f64 {
    1.0
}

impl TaskConfig {
    pub fn effective_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| self.id.clone())
    }

    pub fn effective_role(&self) -> String {
        self.role.clone().unwrap_or_else(|| self.id.clone())
    }
}

/// `[task.done_when]` table. Every listed condition must hold.
///
/// ```toml
/// [task.done_when]
/// exists = ["frontend/next.config.js"]
/// contains = [{ path = "frontend/next.config.js", patterns = ["images:", "compress"] }]
/// min_bytes = [{ path = "README.md", bytes = 1000 }]
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DoneWhenConfig {
    #[serde(default)]
    pub exists: Vec<String>,

    #[serde(default)]
    pub contains: Vec<ContainsCheck>,

    #[serde(default)]
    pub min_bytes: Vec<MinBytesCheck>,
}

impl DoneWhenConfig {
    pub fn is_empty(&self) -> bool {
        self.exists.is_empty() && self.contains.is_empty() && self.min_bytes.is_empty()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContainsCheck {
    pub path: String,
    /// Regular expressions that must all match the file contents.
    pub patterns: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MinBytesCheck {
    pub path: String,
    pub bytes: u64,
}
