// src/state/reconcile.rs

use std::collections::BTreeSet;

use tracing::info;

use crate::dag::completion::CompletionProbe;
use crate::dag::TaskRegistry;
use crate::state::run_state::RunState;
use crate::types::TaskId;

/// Record tasks whose `done_when` check already holds as completed.
///
/// Only tasks that are untouched (not completed, not in progress, not
/// claimed by a worker) are considered, and only once all their
/// dependencies are completed. Tasks are visited in topological order, so a
/// chain of externally finished tasks is picked up in a single pass.
///
/// Completed tasks are never re-checked. Returns the newly completed ids.
pub fn reconcile_completions(
    registry: &TaskRegistry,
    state: &mut RunState,
    active: &BTreeSet<TaskId>,
    probe: &CompletionProbe,
) -> Vec<TaskId> {
    let mut newly_completed = Vec::new();

    for task in registry.topological_order() {
        let Some(check) = task.completion.as_ref() else {
            continue;
        };
        if state.is_completed(&task.id)
            || state.is_in_progress(&task.id)
            || active.contains(&task.id)
        {
            continue;
        }
        if !state.missing_dependencies(task).is_empty() {
            continue;
        }
        if !probe.is_done(&task.id, check) {
            continue;
        }

        state.completed_tasks.insert(task.id.clone());
        info!(task = %task.id, "completion check satisfied; recording task as completed");
        newly_completed.push(task.id.clone());
    }

    newly_completed
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::model::{ConfigFile, RawConfigFile};
    use crate::fs::mock::MockFileSystem;

    fn registry() -> TaskRegistry {
        let raw: RawConfigFile = toml::from_str(
            r#"
[[task]]
id = "setup"
[task.done_when]
exists = ["package.json"]

[[task]]
id = "components"
after = ["setup"]
[task.done_when]
exists = ["components/Button.tsx"]

[[task]]
id = "page"
after = ["components"]

[[task]]
id = "docs"
[task.done_when]
min_bytes = [{ path = "README.md", bytes = 10 }]
"#,
        )
        .unwrap();
        TaskRegistry::from_config(&ConfigFile::try_from(raw).unwrap()).unwrap()
    }

    #[test]
    fn resolves_chains_in_one_pass() {
        let fs = MockFileSystem::new();
        fs.add_file("/proj/package.json", "{}");
        fs.add_file("/proj/components/Button.tsx", "export {}");
        let probe = CompletionProbe::new(Arc::new(fs), "/proj");

        let mut state = RunState::default();
        let done = reconcile_completions(&registry(), &mut state, &BTreeSet::new(), &probe);

        assert_eq!(done, vec!["setup".to_string(), "components".to_string()]);
        assert!(state.is_completed("components"));
        assert!(!state.is_completed("page"));
        assert!(!state.is_completed("docs"));
    }

    #[test]
    fn skips_claimed_and_in_progress_tasks() {
        let fs = MockFileSystem::new();
        fs.add_file("/proj/package.json", "{}");
        fs.add_file("/proj/README.md", "a long enough readme");
        let probe = CompletionProbe::new(Arc::new(fs), "/proj");

        let mut state = RunState::default();
        state.in_progress_tasks.insert("docs".into());
        let active: BTreeSet<TaskId> = ["setup".to_string()].into_iter().collect();

        let done = reconcile_completions(&registry(), &mut state, &active, &probe);
        assert!(done.is_empty());
    }

    #[test]
    fn artifacts_do_not_jump_unfinished_dependencies() {
        let fs = MockFileSystem::new();
        fs.add_file("/proj/components/Button.tsx", "export {}");
        let probe = CompletionProbe::new(Arc::new(fs), "/proj");

        let mut state = RunState::default();
        let done = reconcile_completions(&registry(), &mut state, &BTreeSet::new(), &probe);
        assert!(done.is_empty());
    }
}
