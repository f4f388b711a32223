// src/dag/graph.rs

use std::collections::{BTreeSet, HashMap};

use crate::config::model::ConfigFile;
use crate::types::TaskId;

/// Internal node structure: stores immediate deps and dependents.
#[derive(Debug, Clone)]
struct DagNode {
    /// Declaration index of the task in the config file.
    index: usize,
    /// Direct dependencies: tasks that must complete before this one is ready.
    deps: Vec<TaskId>,
    /// Direct dependents: tasks that depend on this one.
    dependents: Vec<TaskId>,
}

/// In-memory DAG keyed by task id, remembering declaration order.
///
/// Acyclicity and reference validity are checked in `config::validate`, so
/// this only keeps adjacency information for resolution and diagnostics.
#[derive(Debug, Clone)]
pub struct DagGraph {
    order: Vec<TaskId>,
    nodes: HashMap<TaskId, DagNode>,
}

impl DagGraph {
    /// Build a DAG from a validated [`ConfigFile`].
    pub fn from_config(cfg: &ConfigFile) -> Self {
        let mut order = Vec::with_capacity(cfg.task.len());
        let mut nodes: HashMap<TaskId, DagNode> = HashMap::new();

        for (index, task) in cfg.task.iter().enumerate() {
            order.push(task.id.clone());
            nodes.insert(
                task.id.clone(),
                DagNode {
                    index,
                    deps: task.after.clone(),
                    dependents: Vec::new(),
                },
            );
        }

        // Walk in declaration order so dependents lists are deterministic.
        for task in cfg.task.iter() {
            for dep in task.after.iter() {
                if let Some(dep_node) = nodes.get_mut(dep) {
                    dep_node.dependents.push(task.id.clone());
                }
            }
        }

        Self { order, nodes }
    }

    /// All task ids in declaration order.
    pub fn tasks(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Immediate dependencies of a task (the tasks listed in its `after`).
    pub fn dependencies_of(&self, id: &str) -> &[TaskId] {
        self.nodes
            .get(id)
            .map(|n| n.deps.as_slice())
            .unwrap_or(&[])
    }

    /// Immediate dependents of a task (tasks that list this one in their `after`).
    pub fn dependents_of(&self, id: &str) -> &[TaskId] {
        self.nodes
            .get(id)
            .map(|n| n.dependents.as_slice())
            .unwrap_or(&[])
    }

    /// Task ids ordered so every task comes after all of its dependencies.
    ///
    /// Among tasks whose dependencies are already placed, the one declared
    /// first wins, which keeps the order stable across invocations.
    pub fn topological_order(&self) -> Vec<&str> {
        let mut remaining: HashMap<&str, usize> = self
            .nodes
            .iter()
            .map(|(id, node)| (id.as_str(), node.deps.len()))
            .collect();

        let mut frontier: BTreeSet<usize> = self
            .nodes
            .values()
            .filter(|n| n.deps.is_empty())
            .map(|n| n.index)
            .collect();

        let mut out = Vec::with_capacity(self.order.len());
        while let Some(index) = frontier.pop_first() {
            let id = self.order[index].as_str();
            out.push(id);
            for dependent in self.dependents_of(id) {
                if let Some(count) = remaining.get_mut(dependent.as_str()) {
                    *count -= 1;
                    if *count == 0 {
                        if let Some(node) = self.nodes.get(dependent) {
                            frontier.insert(node.index);
                        }
                    }
                }
            }
        }

        out
    }
}
