// tests/scenarios.rs

mod common;

use std::time::Duration;

use chrono::Utc;
use taskwave::dag::{WaveScheduler, WaveStatus};
use taskwave::errors::TaskwaveError;
use taskwave::monitor::{ReportOptions, StatusReport};
use taskwave::state::{MemoryStateStore, RunState, StateStore};
use taskwave::types::Priority;
use taskwave::workers::{ActiveWorkers, MemoryWorkerRegistry};
use taskwave_test_utils::builders::{ConfigFileBuilder, TaskConfigBuilder};

fn abc() -> ConfigFileBuilder {
    ConfigFileBuilder::new()
        .with_task(TaskConfigBuilder::new("A").build())
        .with_task(TaskConfigBuilder::new("B").build())
        .with_task(TaskConfigBuilder::new("C").after("A").after("B").build())
}

/// Worker lifecycle as `taskwave mark <id> completed` performs it.
fn complete(
    registry: &taskwave::dag::TaskRegistry,
    store: &dyn StateStore,
    workers: &dyn ActiveWorkers,
    id: &str,
) {
    store.mark_completed(registry, id).unwrap();
    workers.release(id).unwrap();
}

#[test]
fn independent_roots_dispatch_together_then_dependent() {
    common::init_tracing();
    let reg = abc().build_registry();
    let store = MemoryStateStore::new();
    let workers = MemoryWorkerRegistry::new();
    let sched = WaveScheduler::new(&reg, &store, &workers);

    let wave1 = sched.schedule_wave(4).unwrap();
    assert_eq!(wave1.launched_ids(), vec!["A", "B"]);
    assert!(wave1.next_wave.is_empty());

    complete(&reg, &store, &workers, "A");
    complete(&reg, &store, &workers, "B");

    let wave2 = sched.schedule_wave(4).unwrap();
    assert_eq!(wave2.launched_ids(), vec!["C"]);
}

#[test]
fn single_slot_serializes_the_graph() {
    let reg = abc().build_registry();
    let store = MemoryStateStore::new();
    let workers = MemoryWorkerRegistry::new();
    let sched = WaveScheduler::new(&reg, &store, &workers);

    let wave1 = sched.schedule_wave(1).unwrap();
    assert_eq!(wave1.launched_ids(), vec!["A"]);
    assert_eq!(wave1.next_wave, vec!["B".to_string()]);

    // Slot still occupied by A.
    assert_eq!(sched.schedule_wave(1).unwrap().status, WaveStatus::AtCapacity);

    complete(&reg, &store, &workers, "A");
    assert_eq!(sched.schedule_wave(1).unwrap().launched_ids(), vec!["B"]);

    complete(&reg, &store, &workers, "B");
    assert_eq!(sched.schedule_wave(1).unwrap().launched_ids(), vec!["C"]);

    complete(&reg, &store, &workers, "C");
    assert_eq!(sched.schedule_wave(1).unwrap().status, WaveStatus::AllComplete);
}

#[test]
fn unclaimed_in_progress_task_is_stuck_and_not_ready() {
    let reg = abc().build_registry();
    let mut state = RunState::default();
    state.completed_tasks.insert("A".into());
    state.in_progress_tasks.insert("B".into());

    let opts = ReportOptions::new(4, Duration::from_secs(30 * 60));
    let report = StatusReport::build(&reg, &state, &[], &opts, Utc::now());

    let stuck: Vec<_> = report.stuck.iter().map(|s| s.task.id.as_str()).collect();
    assert_eq!(stuck, vec!["B"]);
    assert!(report.ready.iter().all(|r| r.task.id != "B"));
    assert!(report.ready.is_empty());

    // The wave also leaves B alone.
    let store = MemoryStateStore::with_state(state);
    let workers = MemoryWorkerRegistry::new();
    let out = WaveScheduler::new(&reg, &store, &workers)
        .schedule_wave(4)
        .unwrap();
    assert_eq!(out.status, WaveStatus::NothingReady);
}

#[test]
fn cyclic_registry_is_rejected_before_any_wave() {
    let raw = ConfigFileBuilder::new()
        .with_task(TaskConfigBuilder::new("X").after("Y").build())
        .with_task(TaskConfigBuilder::new("Y").after("X").build())
        .raw();

    match taskwave::config::ConfigFile::try_from(raw) {
        Err(TaskwaveError::DagCycle(msg)) => assert!(msg.contains("cycle detected")),
        Err(e) => panic!("expected DagCycle, got {e:?}"),
        Ok(_) => panic!("expected a cycle error"),
    }
}

#[test]
fn priority_decides_who_gets_the_slots() {
    let reg = ConfigFileBuilder::new()
        .with_task(TaskConfigBuilder::new("high").priority(Priority::High).build())
        .with_task(TaskConfigBuilder::new("critical").priority(Priority::Critical).build())
        .with_task(TaskConfigBuilder::new("medium").priority(Priority::Medium).build())
        .build_registry();
    let store = MemoryStateStore::new();
    let workers = MemoryWorkerRegistry::new();

    let out = WaveScheduler::new(&reg, &store, &workers)
        .schedule_wave(2)
        .unwrap();
    assert_eq!(out.launched_ids(), vec!["critical", "high"]);
    assert_eq!(out.next_wave, vec!["medium".to_string()]);
}

#[test]
fn identical_inputs_give_identical_waves() {
    let build = || {
        let reg = abc().build_registry();
        let store = MemoryStateStore::new();
        let workers = MemoryWorkerRegistry::new();
        WaveScheduler::new(&reg, &store, &workers)
            .preview_wave(1)
            .unwrap()
            .launched_ids()
            .into_iter()
            .map(str::to_string)
            .collect::<Vec<_>>()
    };
    assert_eq!(build(), build());
}

#[test]
fn rerunning_after_a_crash_does_not_double_dispatch() {
    let reg = abc().build_registry();
    let store = MemoryStateStore::new();
    let workers = MemoryWorkerRegistry::new();
    let sched = WaveScheduler::new(&reg, &store, &workers);

    sched.schedule_wave(4).unwrap();
    // Claims vanish (e.g. marker dir wiped) but the state still lists A and B.
    workers.release("A").unwrap();
    workers.release("B").unwrap();

    let again = sched.schedule_wave(4).unwrap();
    assert!(again.launched.is_empty());
    assert_eq!(again.status, WaveStatus::NothingReady);
}
