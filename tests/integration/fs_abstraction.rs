// tests/integration/fs_abstraction.rs

use taskwave::dag::{WaveScheduler, WaveStatus};
use taskwave::state::StateStore;
use taskwave_test_utils::builders::{ConfigFileBuilder, TaskConfigBuilder};

use crate::common::project_in_memory;

#[test]
fn externally_finished_chain_is_reconciled_in_one_wave() {
    let (fs, project) = project_in_memory(
        ConfigFileBuilder::new()
            .with_task(
                TaskConfigBuilder::new("design")
                    .done_when_exists("src/styles/tokens.ts")
                    .build(),
            )
            .with_task(
                TaskConfigBuilder::new("components")
                    .after("design")
                    .done_when_contains("src/components/index.ts", &["export", "Button"])
                    .build(),
            )
            .with_task(TaskConfigBuilder::new("landing").after("components").build()),
    );

    fs.add_file("/proj/src/styles/tokens.ts", "export const x = 1;");
    fs.add_file(
        "/proj/src/components/index.ts",
        "export { Button } from './Button';",
    );

    let out = project.scheduler().schedule_wave(4).unwrap();
    assert_eq!(out.reconciled, vec!["design".to_string(), "components".to_string()]);
    assert_eq!(out.launched_ids(), vec!["landing"]);

    let state = project.store.load().unwrap();
    assert!(state.is_completed("design") && state.is_completed("components"));
}

#[test]
fn unsatisfied_check_leaves_task_ready() {
    let (fs, project) = project_in_memory(
        ConfigFileBuilder::new().with_task(
            TaskConfigBuilder::new("docs")
                .done_when_min_bytes("README.md", 1000)
                .build(),
        ),
    );
    fs.add_file("/proj/README.md", "too short");

    let out = project.scheduler().preview_wave(4).unwrap();
    assert!(out.reconciled.is_empty());
    assert_eq!(out.launched_ids(), vec!["docs"]);
}

#[test]
fn claimed_task_is_not_reconciled_even_if_done() {
    let (fs, project) = project_in_memory(
        ConfigFileBuilder::new()
            .with_task(TaskConfigBuilder::new("a").done_when_exists("a.txt").build()),
    );
    taskwave::commands::mark_in_progress(&project, "a", None, &mut Vec::new()).unwrap();
    fs.add_file("/proj/a.txt", "done");

    let sched: WaveScheduler<'_> = project.scheduler();
    let out = sched.schedule_wave(4).unwrap();
    assert!(out.reconciled.is_empty());
    assert_eq!(out.status, WaveStatus::NothingReady);
}
