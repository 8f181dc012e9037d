// src/config/validate.rs

//! Config-level checks.
//!
//! Structural checks on the task set (duplicate names, unknown `after`
//! references, cycles, Bernstein's conditions) belong to
//! [`TaskSystem::new`](crate::system::TaskSystem::new) and run when the
//! system is built from the config.

use crate::config::model::{ConfigFile, RawConfigFile, TaskConfig};
use crate::errors::{Result, TaskSystemError};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::TaskSystemError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.config, raw.resources, raw.task))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    ensure_has_tasks(cfg)?;
    validate_global_config(cfg)?;
    for task in cfg.task.iter() {
        validate_task_resources(cfg, task)?;
        validate_task_action(task)?;
    }
    Ok(())
}

fn ensure_has_tasks(cfg: &RawConfigFile) -> Result<()> {
    if cfg.task.is_empty() {
        return Err(TaskSystemError::ConfigError(
            "config must contain at least one [[task]] entry".to_string(),
        ));
    }
    Ok(())
}

fn validate_global_config(cfg: &RawConfigFile) -> Result<()> {
    // input_policy is strongly typed and validated during deserialization.

    if cfg.config.workers == Some(0) {
        return Err(TaskSystemError::ConfigError(
            "[config].workers must be >= 1 (got 0)".to_string(),
        ));
    }
    if cfg.config.iterations == 0 {
        return Err(TaskSystemError::ConfigError(
            "[config].iterations must be >= 1 (got 0)".to_string(),
        ));
    }
    if cfg.config.repetitions == 0 {
        return Err(TaskSystemError::ConfigError(
            "[config].repetitions must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

/// Every resource a task declares or its action touches must exist under
/// `[resources]`.
fn validate_task_resources(cfg: &RawConfigFile, task: &TaskConfig) -> Result<()> {
    let action_resources = task
        .action
        .iter()
        .flat_map(|a| a.reads().iter().map(String::as_str).chain(a.target()));

    let declared = task
        .reads
        .iter()
        .chain(task.writes.iter())
        .map(String::as_str)
        .chain(action_resources);

    for resource in declared {
        if !cfg.resources.contains_key(resource) {
            return Err(TaskSystemError::ConfigError(format!(
                "task '{}' references undeclared resource '{}'",
                task.name, resource
            )));
        }
    }
    Ok(())
}

/// A config-defined action must stay within its task's declared accesses.
fn validate_task_action(task: &TaskConfig) -> Result<()> {
    let Some(action) = &task.action else {
        return Ok(());
    };

    if let Some(target) = action.target() {
        if !task.writes.iter().any(|w| w == target) {
            return Err(TaskSystemError::ConfigError(format!(
                "task '{}' writes '{}' but does not list it in `writes`",
                task.name, target
            )));
        }
    }

    for operand in action.reads() {
        let declared = task.reads.iter().chain(task.writes.iter()).any(|r| r == operand);
        if !declared {
            return Err(TaskSystemError::ConfigError(format!(
                "task '{}' reads '{}' but does not list it in `reads` or `writes`",
                task.name, operand
            )));
        }
    }
    Ok(())
}
