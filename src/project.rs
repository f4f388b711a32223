// src/project.rs

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::config::loader::{load_and_validate, ProjectPaths};
use crate::config::model::ConfigFile;
use crate::dag::{CompletionProbe, LaunchSettings, TaskRegistry, WaveScheduler};
use crate::errors::Result;
use crate::fs::{FileSystem, RealFileSystem};
use crate::monitor::ReportOptions;
use crate::state::JsonStateStore;
use crate::workers::MarkerDirRegistry;

/// Everything a command needs, built once from the config file.
///
/// The registry is immutable; the stores hold no cached state, so a
/// `Project` can serve several operations in a row.
#[derive(Debug)]
pub struct Project {
    pub config: ConfigFile,
    pub registry: TaskRegistry,
    pub paths: ProjectPaths,
    pub store: JsonStateStore,
    pub workers: MarkerDirRegistry,
    pub probe: CompletionProbe,
}

impl Project {
    /// Load and validate `config_path` and wire the on-disk stores.
    pub fn load(config_path: &Path) -> Result<Self> {
        let config = load_and_validate(config_path)?;
        Self::from_config(config, config_path, Arc::new(RealFileSystem))
    }

    /// Wire a validated config to the stores on `fs`.
    pub fn from_config(
        config: ConfigFile,
        config_path: &Path,
        fs: Arc<dyn FileSystem>,
    ) -> Result<Self> {
        let registry = TaskRegistry::from_config(&config)?;
        let paths = ProjectPaths::new(config_path, &config);
        debug!(
            root = ?paths.root,
            state_file = ?paths.state_file,
            marker_dir = ?paths.marker_dir,
            tasks = registry.len(),
            "project loaded"
        );

        Ok(Self {
            store: JsonStateStore::new(fs.clone(), paths.state_file.clone()),
            workers: MarkerDirRegistry::new(fs.clone(), paths.marker_dir.clone()),
            probe: CompletionProbe::new(fs, paths.root.clone()),
            config,
            registry,
            paths,
        })
    }

    /// `max_concurrent` from the CLI if given, else from `[config]`.
    pub fn max_concurrent(&self, cli_override: Option<u64>) -> usize {
        cli_override
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(self.config.config.max_concurrent)
    }

    pub fn launch_settings(&self) -> LaunchSettings {
        LaunchSettings {
            template: self.config.config.launch_template.clone(),
            root: self.paths.root.clone(),
        }
    }

    pub fn scheduler(&self) -> WaveScheduler<'_> {
        WaveScheduler::new(&self.registry, &self.store, &self.workers)
            .with_completion_probe(self.probe.clone())
            .with_launch_settings(self.launch_settings())
    }

    pub fn report_options(&self, max_concurrent: usize) -> ReportOptions {
        ReportOptions::new(max_concurrent, self.config.stuck_grace)
            .with_launch_settings(self.launch_settings())
            .with_completion_probe(self.probe.clone())
    }
}
