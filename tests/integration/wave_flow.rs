// tests/integration/wave_flow.rs

use taskwave::commands;
use taskwave::dag::WaveStatus;
use taskwave::exec::Launcher;
use taskwave::types::Priority;
use taskwave::workers::ActiveWorkers;
use taskwave_test_utils::builders::{ConfigFileBuilder, TaskConfigBuilder};
use taskwave_test_utils::fake_launcher::FakeLauncher;

use crate::common::project_in_memory;

fn builder() -> ConfigFileBuilder {
    ConfigFileBuilder::new()
        .launch_template("AGENT_ROLE={role} agent-run --prompt {prompt}")
        .with_task(
            TaskConfigBuilder::new("design-system")
                .priority(Priority::Critical)
                .role("designer")
                .prompt("Create the design system")
                .build(),
        )
        .with_task(
            TaskConfigBuilder::new("api")
                .priority(Priority::High)
                .cmd("make api")
                .build(),
        )
        .with_task(
            TaskConfigBuilder::new("landing")
                .after("design-system")
                .after("api")
                .build(),
        )
}

#[tokio::test]
async fn launcher_receives_rendered_directives() {
    let (_fs, project) = project_in_memory(builder());
    let mut fake = FakeLauncher::new();

    let run = commands::wave(
        &project,
        4,
        false,
        Some(&mut fake as &mut dyn Launcher),
        false,
        &mut Vec::new(),
    )
    .await
    .unwrap();

    assert_eq!(run.outcome.status, WaveStatus::Launched);
    assert_eq!(fake.launched_ids(), vec!["design-system", "api"]);

    let directives = fake.launched();
    assert_eq!(
        directives[0].command.as_deref(),
        Some("AGENT_ROLE='designer' agent-run --prompt 'Create the design system'")
    );
    assert_eq!(directives[1].command.as_deref(), Some("make api"));
    assert_eq!(run.launch.unwrap().launched.len(), 2);
}

#[tokio::test]
async fn failed_launch_keeps_the_claim() {
    let (_fs, project) = project_in_memory(builder());
    let mut fake = FakeLauncher::new().failing_on("api");
    let mut out = Vec::new();

    let run = commands::wave(
        &project,
        4,
        false,
        Some(&mut fake as &mut dyn Launcher),
        false,
        &mut out,
    )
    .await
    .unwrap();

    let report = run.launch.unwrap();
    assert_eq!(report.failed[0].0, "api");
    assert!(project.workers.active_task_ids().unwrap().contains("api"));
    assert!(String::from_utf8(out).unwrap().contains("failed to launch 'api'"));
}

#[tokio::test]
async fn dry_run_never_calls_the_launcher() {
    let (_fs, project) = project_in_memory(builder());
    let mut fake = FakeLauncher::new();

    commands::wave(
        &project,
        4,
        true,
        Some(&mut fake as &mut dyn Launcher),
        false,
        &mut Vec::new(),
    )
    .await
    .unwrap();

    assert!(fake.launched().is_empty());
    assert!(project.workers.list_active().unwrap().is_empty());
}

#[test]
fn status_json_reflects_a_full_lifecycle() {
    let (_fs, project) = project_in_memory(builder());
    commands::mark_in_progress(&project, "api", None, &mut Vec::new()).unwrap();
    commands::mark_completed(&project, "api", &mut Vec::new()).unwrap();

    let mut out = Vec::new();
    commands::status(&project, 4, true, &mut out).unwrap();
    let doc: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(doc["completed"], 1);
    assert_eq!(doc["total"], 3);
    assert_eq!(doc["percent"], 33);
    assert_eq!(doc["ready"][0]["id"], "design-system");
    assert_eq!(doc["blocked"][0]["missing"][0], "design-system");
}
