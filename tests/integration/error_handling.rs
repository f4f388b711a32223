// tests/integration/error_handling.rs

use std::io::Write;

use chrono::Utc;
use taskwave::config::load_and_validate;
use taskwave::dag::WaveStatus;
use taskwave::errors::TaskwaveError;
use taskwave::state::StateStore;
use taskwave::workers::{ActiveWorkerRecord, ActiveWorkers};
use taskwave_test_utils::builders::{ConfigFileBuilder, TaskConfigBuilder};
use tempfile::NamedTempFile;

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn test_dag_cycle_returns_structured_error() {
    let file = config_file(
        r#"
[[task]]
id = "A"
after = ["B"]

[[task]]
id = "B"
after = ["A"]
"#,
    );

    match load_and_validate(file.path()) {
        Err(err @ TaskwaveError::DagCycle(_)) => {
            let msg = err.to_string();
            assert!(msg.contains("cycle detected"));
            assert!(msg.contains('A') || msg.contains('B'));
            assert_eq!(err.exit_code(), 2);
        }
        Err(e) => panic!("Expected DagCycle error, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_unknown_dependency_returns_config_error() {
    let file = config_file(
        r#"
[[task]]
id = "A"
after = ["ghost"]
"#,
    );

    match load_and_validate(file.path()) {
        Err(TaskwaveError::ConfigError(msg)) => {
            assert!(msg.contains("unknown dependency 'ghost'"));
        }
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_unknown_field_is_a_toml_error() {
    let file = config_file(
        r#"
[[task]]
id = "A"
watch = ["src/**"]
"#,
    );

    let err = load_and_validate(file.path()).unwrap_err();
    assert!(matches!(err, TaskwaveError::TomlError(_)));
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn test_corrupt_state_is_rejected_with_exit_code_3() {
    let (dir, project) = crate::common::project_on_disk(
        r#"
[[task]]
id = "A"
"#,
    );
    let state_path = dir.path().join(".taskwave/state.json");
    std::fs::create_dir_all(state_path.parent().unwrap()).unwrap();
    std::fs::write(&state_path, r#"{ "completedTasks": ["A"] }"#).unwrap();

    let err = project.store.load().unwrap_err();
    assert!(matches!(err, TaskwaveError::StateCorrupt { .. }));
    assert_eq!(err.exit_code(), 3);
}

#[test]
fn test_release_frees_slot_held_by_removed_task() {
    let (_fs, project) = crate::common::project_in_memory(
        ConfigFileBuilder::new()
            .max_concurrent(1)
            .with_task(TaskConfigBuilder::new("a").build()),
    );
    let stale = ActiveWorkerRecord::new("old", "old", Utc::now());
    project.workers.claim(&stale).unwrap();

    let blocked = project.scheduler().schedule_wave(1).unwrap();
    assert_eq!(blocked.status, WaveStatus::AtCapacity);

    let mut out = Vec::new();
    taskwave::commands::release(&project, "old", &mut out).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "old: claim released\n");

    let wave = project.scheduler().schedule_wave(1).unwrap();
    assert_eq!(wave.launched_ids(), vec!["a"]);
}

#[test]
fn test_release_rejects_malformed_task_id() {
    let (_fs, project) = crate::common::project_in_memory(
        ConfigFileBuilder::new().with_task(TaskConfigBuilder::new("a").build()),
    );
    let err = taskwave::commands::release(&project, "../state", &mut Vec::new()).unwrap_err();
    assert!(matches!(err, TaskwaveError::TaskNotFound(_)));
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn test_bundled_demo_config_is_valid() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/Taskwave.toml");
    let cfg = load_and_validate(&path).unwrap();
    assert_eq!(cfg.task.len(), 9);
    assert_eq!(cfg.stuck_grace, std::time::Duration::from_secs(30 * 60));
}
