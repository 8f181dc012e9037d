#![allow(dead_code)]

use std::collections::BTreeMap;
use bernstein::config::{ActionSpec, ConfigFile, ConfigSection, RawConfigFile, TaskConfig};
use bernstein::errors::Result;
use bernstein::types::InputPolicy;

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                config: ConfigSection::default(),
                resources: BTreeMap::new(),
                task: Vec::new(),
            },
        }
    }

    pub fn with_task(mut self, task: TaskConfig) -> Self {
        self.config.task.push(task);
        self
    }

    pub fn with_resource(mut self, name: &str, initial: i64) -> Self {
        self.config.resources.insert(name.to_string(), initial);
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.config.config.workers = Some(workers);
        self
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.config.config.iterations = iterations;
        self
    }

    pub fn with_repetitions(mut self, repetitions: usize) -> Self {
        self.config.config.repetitions = repetitions;
        self
    }

    pub fn with_input_policy(mut self, policy: InputPolicy) -> Self {
        self.config.config.input_policy = policy;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.config.seed = Some(seed);
        self
    }

    /// Validate without panicking, for tests that expect a config error.
    pub fn try_build(self) -> Result<ConfigFile> {
        ConfigFile::try_from(self.config)
    }

    pub fn build(self) -> ConfigFile {
        self.try_build().expect("Failed to build valid config from builder")
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
    pub fn new(name: &str) -> Self {
        Self {
            task: TaskConfig {
                name: name.to_string(),
                reads: vec![],
                writes: vec![],
                after: vec![],
                delay_ms: None,
                action: None,
            },
        }
    }

    pub fn reads(mut self, resource: &str) -> Self {
        self.task.reads.push(resource.to_string());
        self
    }

    pub fn writes(mut self, resource: &str) -> Self {
        self.task.writes.push(resource.to_string());
        self
    }

    pub fn after(mut self, dep: &str) -> Self {
        self.task.after.push(dep.to_string());
        self
    }

    pub fn delay_ms(mut self, millis: u64) -> Self {
        self.task.delay_ms = Some(millis);
        self
    }

    pub fn set(mut self, target: &str, value: i64) -> Self {
        self.task.action = Some(ActionSpec::Set {
            target: target.to_string(),
            value,
        });
        self
    }

    pub fn sum(mut self, target: &str, operands: &[&str]) -> Self {
        self.task.action = Some(ActionSpec::Sum {
            target: target.to_string(),
            operands: operands.iter().map(|s| s.to_string()).collect(),
        });
        self
    }

    pub fn sleep(mut self, millis: u64) -> Self {
        self.task.action = Some(ActionSpec::Sleep { millis });
        self
    }

    pub fn build(self) -> TaskConfig {
        self.task
    }
}
