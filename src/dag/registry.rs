// src/dag/registry.rs

use std::collections::HashMap;

use crate::config::model::ConfigFile;
use crate::dag::graph::DagGraph;
use crate::dag::task_info::Task;
use crate::errors::{Result, TaskwaveError};

/// The static task catalog.
///
/// Built once from a validated [`ConfigFile`] and passed by reference to the
/// resolver, the wave scheduler and the monitor. There are no mutation
/// operations.
#[derive(Debug, Clone)]
pub struct TaskRegistry {
    graph: DagGraph,
    tasks: Vec<Task>,
    by_id: HashMap<String, usize>,
}

impl TaskRegistry {
    pub fn from_config(cfg: &ConfigFile) -> Result<Self> {
        let graph = DagGraph::from_config(cfg);

        let mut tasks = Vec::with_capacity(cfg.task.len());
        let mut by_id = HashMap::with_capacity(cfg.task.len());
        for (index, tc) in cfg.task.iter().enumerate() {
            tasks.push(Task::from_config(tc, index)?);
            by_id.insert(tc.id.clone(), index);
        }

        Ok(Self {
            graph,
            tasks,
            by_id,
        })
    }

    pub fn get_task(&self, id: &str) -> Option<&Task> {
        self.by_id.get(id).map(|&i| &self.tasks[i])
    }

    /// Like [`get_task`](Self::get_task) but yields `TaskNotFound`.
    pub fn task(&self, id: &str) -> Result<&Task> {
        self.get_task(id)
            .ok_or_else(|| TaskwaveError::TaskNotFound(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Tasks in declaration order.
    pub fn all_tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn graph(&self) -> &DagGraph {
        &self.graph
    }

    /// Tasks ordered dependencies-first, ties by declaration order.
    pub fn topological_order(&self) -> Vec<&Task> {
        self.graph
            .topological_order()
            .into_iter()
            .filter_map(|id| self.get_task(id))
            .collect()
    }
}
