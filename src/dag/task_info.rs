// src/dag/task_info.rs

//! Static task definitions and the launch directives built from them.

use std::path::PathBuf;

use serde::Serialize;

use crate::config::model::TaskConfig;
use crate::dag::completion::CompletionCheck;
use crate::errors::Result;
use crate::types::{Priority, TaskId};

/// A task as loaded from the registry. Immutable for the life of the process.
#[derive(Debug, Clone)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    pub description: Option<String>,
    /// Direct dependencies (ids listed in `after = [...]`).
    pub dependencies: Vec<TaskId>,
    pub priority: Priority,
    pub estimated_hours: f64,
    pub prompt: Option<String>,
    pub cmd: Option<String>,
    pub role: String,
    pub completion: Option<CompletionCheck>,
    /// Position in the config file; secondary ordering key after priority.
    pub declaration_index: usize,
}

impl Task {
    pub fn from_config(cfg: &TaskConfig, declaration_index: usize) -> Result<Self> {
        let completion = cfg
            .done_when
            .as_ref()
            .map(|dw| CompletionCheck::from_config(&cfg.id, dw))
            .transpose()?;

        Ok(Self {
            id: cfg.id.clone(),
            name: cfg.effective_name(),
            description: cfg.description.clone(),
            dependencies: cfg.after.clone(),
            priority: cfg.priority,
            estimated_hours: cfg.estimated_hours,
            prompt: cfg.prompt.clone(),
            cmd: cfg.cmd.clone(),
            role: cfg.effective_role(),
            completion,
            declaration_index,
        })
    }
}

/// How directives turn into concrete commands.
#[derive(Debug, Clone, Default)]
pub struct LaunchSettings {
    /// `[config].launch_template`, used when a task has no `cmd`.
    pub template: Option<String>,
    /// Project root, substituted for `{root}`.
    pub root: PathBuf,
}

/// What the external executor should run for a selected task.
///
/// The scheduler never runs anything itself: it hands these to a
/// [`crate::exec::Launcher`] (or prints them for a human).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchDirective {
    pub task_id: TaskId,
    pub name: String,
    pub role: String,
    pub priority: Priority,
    pub dependencies: Vec<TaskId>,
    pub estimated_hours: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
}

impl LaunchDirective {
    pub fn for_task(task: &Task, settings: &LaunchSettings) -> Self {
        let command = match (&task.cmd, &settings.template) {
            (Some(cmd), _) => Some(cmd.clone()),
            (None, Some(template)) => Some(render_template(template, task, settings)),
            (None, None) => None,
        };

        Self {
            task_id: task.id.clone(),
            name: task.name.clone(),
            role: task.role.clone(),
            priority: task.priority,
            dependencies: task.dependencies.clone(),
            estimated_hours: task.estimated_hours,
            prompt: task.prompt.clone(),
            command,
        }
    }
}

/// Fill `{id}`, `{name}`, `{role}`, `{root}` and `{prompt}` in one pass.
///
/// Inserted values are never rescanned, so a placeholder inside a task name
/// or prompt stays literal. Unknown `{...}` sequences are copied as is.
fn render_template(template: &str, task: &Task, settings: &LaunchSettings) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        rest = &rest[open..];
        let Some(close) = rest.find('}') else {
            break;
        };
        match placeholder_value(&rest[1..close], task, settings) {
            Some(value) => out.push_str(&value),
            None => out.push_str(&rest[..=close]),
        }
        rest = &rest[close + 1..];
    }
    out.push_str(rest);
    out
}

fn placeholder_value(key: &str, task: &Task, settings: &LaunchSettings) -> Option<String> {
    let value = match key {
        "id" => task.id.clone(),
        "name" => shell_quote(&task.name),
        "role" => shell_quote(&task.role),
        "root" => shell_quote(&settings.root.to_string_lossy()),
        "prompt" => shell_quote(task.prompt.as_deref().unwrap_or("")),
        _ => return None,
    };
    Some(value)
}

/// Quote `s` for POSIX `sh` using single quotes.
pub fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}
