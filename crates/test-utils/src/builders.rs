#![allow(dead_code)]

use taskwave::config::{
    ConfigFile, ConfigSection, ContainsCheck, DoneWhenConfig, MinBytesCheck, RawConfigFile,
    TaskConfig,
};
use taskwave::dag::TaskRegistry;
use taskwave::types::Priority;

/// Builder for `ConfigFile` to simplify test setup.
///
/// Tasks keep the order in which they are added.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                config: ConfigSection::default(),
                task: Vec::new(),
            },
        }
    }

    pub fn with_task(mut self, task: TaskConfig) -> Self {
        self.config.task.push(task);
        self
    }

    pub fn max_concurrent(mut self, n: usize) -> Self {
        self.config.config.max_concurrent = n;
        self
    }

    pub fn stuck_grace(mut self, grace: &str) -> Self {
        self.config.config.stuck_grace = grace.to_string();
        self
    }

    pub fn launch_template(mut self, template: &str) -> Self {
        self.config.config.launch_template = Some(template.to_string());
        self
    }

    /// The unvalidated config, for tests that expect validation to fail.
    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }

    pub fn build_registry(self) -> TaskRegistry {
        TaskRegistry::from_config(&self.build()).expect("Failed to build registry from config")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `TaskConfig`.
pub struct TaskConfigBuilder {
    task: TaskConfig,
}

impl TaskConfigBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            task: TaskConfig {
                id: id.to_string(),
                name: None,
                description: None,
                after: vec![],
                priority: Priority::default(),
                estimated_hours: 1.0,
                prompt: None,
                cmd: None,
                role: None,
                done_when: None,
            },
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.task.name = Some(name.to_string());
        self
    }

    pub fn after(mut self, dep: &str) -> Self {
        self.task.after.push(dep.to_string());
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.task.priority = priority;
        self
    }

    pub fn estimated_hours(mut self, hours: f64) -> Self {
        self.task.estimated_hours = hours;
        self
    }

    pub fn prompt(mut self, prompt: &str) -> Self {
        self.task.prompt = Some(prompt.to_string());
        self
    }

    pub fn cmd(mut self, cmd: &str) -> Self {
        self.task.cmd = Some(cmd.to_string());
        self
    }

    pub fn role(mut self, role: &str) -> Self {
        self.task.role = Some(role.to_string());
        self
    }

    pub fn done_when_exists(mut self, path: &str) -> Self {
        self.done_when().exists.push(path.to_string());
        self
    }

    pub fn done_when_contains(mut self, path: &str, patterns: &[&str]) -> Self {
        self.done_when().contains.push(ContainsCheck {
            path: path.to_string(),
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
        });
        self
    }

    pub fn done_when_min_bytes(mut self, path: &str, bytes: u64) -> Self {
        self.done_when().min_bytes.push(MinBytesCheck {
            path: path.to_string(),
            bytes,
        });
        self
    }

    fn done_when(&mut self) -> &mut DoneWhenConfig {
        self.task.done_when.get_or_insert_with(DoneWhenConfig::default)
    }

    pub fn build(self) -> TaskConfig {
        self.task
    }
}
