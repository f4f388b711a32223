// src/config/validate.rs

use std::collections::HashSet;
use std::time::Duration;

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use regex::Regex;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{Result, TaskwaveError};
use crate::types::parse_duration;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::TaskwaveError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let stuck_grace = validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.config, raw.task, stuck_grace))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<Duration> {
    ensure_has_tasks(cfg)?;
    let stuck_grace = validate_global_config(cfg)?;
    validate_task_ids(cfg)?;
    validate_task_fields(cfg)?;
    validate_task_dependencies(cfg)?;
    validate_dag(cfg)?;
    Ok(stuck_grace)
}

fn ensure_has_tasks(cfg: &RawConfigFile) -> Result<()> {
    if cfg.task.is_empty() {
        return Err(TaskwaveError::ConfigError(
            "config must contain at least one [[task]] entry".to_string(),
        ));
    }
    Ok(())
}

fn validate_global_config(cfg: &RawConfigFile) -> Result<Duration> {
    if cfg.config.max_concurrent == 0 {
        return Err(TaskwaveError::ConfigError(
            "[config].max_concurrent must be >= 1 (got 0)".to_string(),
        ));
    }

    parse_duration(&cfg.config.stuck_grace).map_err(|e| {
        TaskwaveError::ConfigError(format!("[config].stuck_grace: {e}"))
    })
}

/// Task ids double as marker file names, so only a safe character set is
/// allowed.
pub fn is_valid_task_id(id: &str) -> bool {
    !id.is_empty()
        && id != "."
        && id != ".."
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

fn validate_task_ids(cfg: &RawConfigFile) -> Result<()> {
    let mut seen: HashSet<&str> = HashSet::new();
    for task in cfg.task.iter() {
        if !is_valid_task_id(&task.id) {
            return Err(TaskwaveError::ConfigError(format!(
                "task id '{}' is invalid (allowed: letters, digits, '-', '_', '.')",
                task.id
            )));
        }
        if !seen.insert(task.id.as_str()) {
            return Err(TaskwaveError::ConfigError(format!(
                "task '{}' is declared more than once",
                task.id
            )));
        }
    }
    Ok(())
}

fn validate_task_fields(cfg: &RawConfigFile) -> Result<()> {
    for task in cfg.task.iter() {
        if !task.estimated_hours.is_finite() || task.estimated_hours < 0.0 {
            return Err(TaskwaveError::ConfigError(format!(
                "task '{}' has invalid estimated_hours {} (must be >= 0)",
                task.id, task.estimated_hours
            )));
        }

        let Some(done_when) = task.done_when.as_ref() else {
            continue;
        };

        if done_when.is_empty() {
            return Err(TaskwaveError::ConfigError(format!(
                "task '{}' has an empty `done_when` table",
                task.id
            )));
        }

        for check in done_when.contains.iter() {
            for pattern in check.patterns.iter() {
                Regex::new(pattern).map_err(|e| {
                    TaskwaveError::ConfigError(format!(
                        "task '{}' has invalid `done_when.contains` pattern '{}': {}",
                        task.id, pattern, e
                    ))
                })?;
            }
        }
    }
    Ok(())
}

fn validate_task_dependencies(cfg: &RawConfigFile) -> Result<()> {
    let ids: HashSet<&str> = cfg.task.iter().map(|t| t.id.as_str()).collect();

    for task in cfg.task.iter() {
        for dep in task.after.iter() {
            if dep == &task.id {
                return Err(TaskwaveError::ConfigError(format!(
                    "task '{}' cannot depend on itself in `after`",
                    task.id
                )));
            }
            if !ids.contains(dep.as_str()) {
                return Err(TaskwaveError::ConfigError(format!(
                    "task '{}' has unknown dependency '{}' in `after`",
                    task.id, dep
                )));
            }
        }
    }
    Ok(())
}

fn validate_dag(cfg: &RawConfigFile) -> Result<()> {
    // Edge direction: dep -> task
    // For:
    //   [[task]]
    //   id = "B"
    //   after = ["A"]
    // we add edge A -> B.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for task in cfg.task.iter() {
        graph.add_node(task.id.as_str());
    }

    for task in cfg.task.iter() {
        for dep in task.after.iter() {
            graph.add_edge(dep.as_str(), task.id.as_str(), ());
        }
    }

    match toposort(&graph, None) {
        Ok(_order) => Ok(()),
        Err(cycle) => {
            let node = cycle.node_id();
            Err(TaskwaveError::DagCycle(format!(
                "cycle detected in task graph involving task '{}'",
                node
            )))
        }
    }
}
