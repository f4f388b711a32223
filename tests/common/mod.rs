#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use taskwave::fs::mock::MockFileSystem;
use taskwave::Project;
use taskwave_test_utils::builders::ConfigFileBuilder;
use tempfile::TempDir;

pub use taskwave_test_utils::init_tracing;

/// Write `toml` as `Taskwave.toml` into a fresh temp dir and load it with
/// the real filesystem.
pub fn project_on_disk(toml: &str) -> (TempDir, Project) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let config_path = dir.path().join("Taskwave.toml");
    std::fs::write(&config_path, toml).expect("write config");
    let project = Project::load(&config_path).expect("load project");
    (dir, project)
}

/// Build a project from `builder` backed by a mock filesystem rooted at `/proj`.
pub fn project_in_memory(builder: ConfigFileBuilder) -> (MockFileSystem, Project) {
    let fs = MockFileSystem::new();
    let project = Project::from_config(
        builder.build(),
        Path::new("/proj/Taskwave.toml"),
        Arc::new(fs.clone()),
    )
    .expect("build project");
    (fs, project)
}
