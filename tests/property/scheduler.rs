// tests/property/scheduler.rs

use std::collections::BTreeSet;

use proptest::prelude::*;
use taskwave::dag::{TaskRegistry, WaveScheduler, WaveStatus};
use taskwave::state::{MemoryStateStore, StateStore};
use taskwave::types::Priority;
use taskwave::workers::{ActiveWorkers, MemoryWorkerRegistry};
use taskwave_test_utils::builders::{ConfigFileBuilder, TaskConfigBuilder};

fn priority_strategy() -> impl Strategy<Value = Priority> {
    prop_oneof![
        Just(Priority::Critical),
        Just(Priority::High),
        Just(Priority::Medium),
        Just(Priority::Low),
    ]
}

// Strategy to generate a valid DAG registry.
// We ensure acyclicity by only allowing task N to depend on tasks 0..N-1.
fn dag_strategy(max_tasks: usize) -> impl Strategy<Value = TaskRegistry> {
    (1..=max_tasks).prop_flat_map(|num_tasks| {
        proptest::collection::vec(
            (
                proptest::collection::vec(any::<usize>(), 0..4),
                priority_strategy(),
            ),
            num_tasks,
        )
        .prop_map(|tasks| {
            let mut builder = ConfigFileBuilder::new();
            for (i, (raw_deps, priority)) in tasks.into_iter().enumerate() {
                let mut task = TaskConfigBuilder::new(&format!("task_{i}")).priority(priority);
                if i > 0 {
                    let deps: BTreeSet<usize> = raw_deps.into_iter().map(|d| d % i).collect();
                    for dep in deps {
                        task = task.after(&format!("task_{dep}"));
                    }
                }
                builder = builder.with_task(task.build());
            }
            builder.build_registry()
        })
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn waves_respect_dependencies_and_ceiling_until_done(
        registry in dag_strategy(12),
        max_concurrent in 1usize..5,
        picks in proptest::collection::vec(any::<usize>(), 64),
    ) {
        let store = MemoryStateStore::new();
        let workers = MemoryWorkerRegistry::new();
        let sched = WaveScheduler::new(&registry, &store, &workers);

        let mut dispatched: BTreeSet<String> = BTreeSet::new();
        let limit = registry.len() * 2 + 4;

        for step in 0..limit {
            let before = store.load().unwrap();
            let out = sched.schedule_wave(max_concurrent).unwrap();

            if out.status == WaveStatus::AllComplete {
                break;
            }

            for d in &out.launched {
                // Dependency invariant.
                for dep in &d.dependencies {
                    prop_assert!(before.is_completed(dep), "{} launched before {}", d.task_id, dep);
                }
                // No double dispatch.
                prop_assert!(dispatched.insert(d.task_id.clone()), "{} dispatched twice", d.task_id);
            }

            // Concurrency ceiling.
            let active = workers.active_task_ids().unwrap();
            prop_assert!(active.len() <= max_concurrent);

            // Finish one running worker, chosen by the random picks.
            let running: Vec<String> = active.into_iter().collect();
            prop_assert!(!running.is_empty(), "no progress possible at step {}", step);
            let id = &running[picks[step % picks.len()] % running.len()];
            store.mark_completed(&registry, id).unwrap();
            workers.release(id).unwrap();

            let after = store.load().unwrap();
            prop_assert!(before.completed_tasks.is_subset(&after.completed_tasks));
        }

        let state = store.load().unwrap();
        prop_assert_eq!(state.completed_tasks.len(), registry.len());
        prop_assert!(state.in_progress_tasks.is_empty());
        prop_assert_eq!(dispatched.len(), registry.len());
    }

    #[test]
    fn previews_are_deterministic(
        registry in dag_strategy(10),
        max_concurrent in 1usize..5,
    ) {
        let run = || {
            let store = MemoryStateStore::new();
            let workers = MemoryWorkerRegistry::new();
            WaveScheduler::new(&registry, &store, &workers)
                .preview_wave(max_concurrent)
                .unwrap()
                .launched_ids()
                .into_iter()
                .map(str::to_string)
                .collect::<Vec<_>>()
        };
        prop_assert_eq!(run(), run());
    }
}
