// tests/integration/state_persistence.rs

use taskwave::state::StateStore;
use taskwave::workers::ActiveWorkers;
use taskwave::Project;

use crate::common::project_on_disk;

const CONFIG: &str = r#"
[config]
max_concurrent = 2

[[task]]
id = "schema"
priority = "critical"

[[task]]
id = "api"
after = ["schema"]
"#;

#[test]
fn wave_state_survives_a_fresh_process() {
    let (dir, project) = project_on_disk(CONFIG);
    let out = project.scheduler().schedule_wave(2).unwrap();
    assert_eq!(out.launched_ids(), vec!["schema"]);

    let raw = std::fs::read_to_string(dir.path().join(".taskwave/state.json")).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(doc["inProgressTasks"][0], "schema");
    assert_eq!(doc["completedTasks"].as_array().unwrap().len(), 0);
    assert_eq!(doc["totalTasks"], 2);
    assert!(doc["timestamp"].is_string());
    assert!(dir.path().join(".taskwave/active/schema.active").is_file());

    // A new process sees the same state and claims.
    let again = Project::load(&dir.path().join("Taskwave.toml")).unwrap();
    assert!(again.store.load().unwrap().is_in_progress("schema"));
    assert_eq!(again.workers.list_active().unwrap()[0].task_id, "schema");

    let out = again.scheduler().schedule_wave(2).unwrap();
    assert!(out.launched.is_empty());
}

#[test]
fn completion_unlocks_dependents_across_runs() {
    let (dir, project) = project_on_disk(CONFIG);
    project.scheduler().schedule_wave(2).unwrap();
    taskwave::commands::mark_completed(&project, "schema", &mut Vec::new()).unwrap();
    assert!(!dir.path().join(".taskwave/active/schema.active").exists());

    let again = Project::load(&dir.path().join("Taskwave.toml")).unwrap();
    let out = again.scheduler().schedule_wave(2).unwrap();
    assert_eq!(out.launched_ids(), vec!["api"]);
}

#[test]
fn state_written_by_hand_in_the_documented_shape_loads() {
    let (dir, project) = project_on_disk(CONFIG);
    std::fs::create_dir_all(dir.path().join(".taskwave")).unwrap();
    std::fs::write(
        dir.path().join(".taskwave/state.json"),
        r#"{ "completedTasks": ["schema"], "inProgressTasks": [], "readyTasks": ["api"] }"#,
    )
    .unwrap();

    let state = project.store.load().unwrap();
    assert!(state.is_completed("schema"));
}
