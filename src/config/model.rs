// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::types::InputPolicy;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [config]
/// workers = 4
/// iterations = 5
/// repetitions = 5
/// input_policy = "randomize"
///
/// [resources]
/// X = 0
/// Y = 0
///
/// [[task]]
/// name = "T1"
/// writes = ["X"]
/// action = { op = "set", target = "X", value = 1 }
///
/// [[task]]
/// name = "T2"
/// reads = ["X"]
/// writes = ["Y"]
/// after = ["T1"]
/// action = { op = "sum", target = "Y", operands = ["X", "X"] }
/// ```
///
/// Tasks are an array of tables so that the file order is the registration
/// order the schedulers scan in.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub config: ConfigSection,

    /// Shared variables and their initial values.
    #[serde(default)]
    pub resources: BTreeMap<String, i64>,

    #[serde(default)]
    pub task: Vec<TaskConfig>,
}

/// Validated configuration. Obtain one through
/// `ConfigFile::try_from(raw)` or [`load_and_validate`](super::load_and_validate).
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub config: ConfigSection,
    pub resources: BTreeMap<String, i64>,
    pub task: Vec<TaskConfig>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        config: ConfigSection,
        resources: BTreeMap<String, i64>,
        task: Vec<TaskConfig>,
    ) -> Self {
        Self {
            config,
            resources,
            task,
        }
    }
}

/// `[config]` section: scheduling and diagnostics knobs.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigSection {
    /// Maximum number of actions the parallel scheduler runs at once.
    ///
    /// If `None`, the available parallelism of the machine is used.
    #[serde(default)]
    pub workers: Option<usize>,

    /// Parallel runs compared by the determinism check.
    #[serde(default = "default_iterations")]
    pub iterations: usize,

    /// Sequential/parallel pairs timed by the cost measurement.
    #[serde(default = "default_repetitions")]
    pub repetitions: usize,

    /// `"randomize"` (default) or `"fixed"`.
    #[serde(default)]
    pub input_policy: InputPolicy,

    /// Seed for the determinism check's input generator.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_iterations() -> usize {
    crate::diag::determinism::DEFAULT_ITERATIONS
}

fn default_repetitions() -> usize {
    crate::diag::cost::DEFAULT_REPETITIONS
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            workers: None,
            iterations: default_iterations(),
            repetitions: default_repetitions(),
            input_policy: InputPolicy::default(),
            seed: None,
        }
    }
}

/// One `[[task]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskConfig {
    pub name: String,

    /// Resources the action consults without modifying.
    #[serde(default)]
    pub reads: Vec<String>,

    /// Resources the action modifies.
    #[serde(default)]
    pub writes: Vec<String>,

    /// Direct prerequisites: this task waits for all tasks listed here.
    #[serde(default)]
    pub after: Vec<String>,

    /// Milliseconds to sleep before running the action, to give tasks a
    /// measurable cost.
    #[serde(default)]
    pub delay_ms: Option<u64>,

    /// What the task does; a task without an action is a no-op.
    #[serde(default)]
    pub action: Option<ActionSpec>,
}

/// Built-in action vocabulary for config-defined tasks.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum ActionSpec {
    /// `target = value`
    Set { target: String, value: i64 },
    /// `target = operands[0] + operands[1] + ...`
    Sum { target: String, operands: Vec<String> },
    /// Sleep without touching any resource.
    Sleep { millis: u64 },
}

impl ActionSpec {
    /// Resources the action reads.
    pub fn reads(&self) -> &[String] {
        match self {
            ActionSpec::Sum { operands, .. } => operands,
            ActionSpec::Set { .. } | ActionSpec::Sleep { .. } => &[],
        }
    }

    /// Resource the action writes, if any.
    pub fn target(&self) -> Option<&str> {
        match self {
            ActionSpec::Set { target, .. } | ActionSpec::Sum { target, .. } => Some(target),
            ActionSpec::Sleep { .. } => None,
        }
    }
}
