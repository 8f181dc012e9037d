// src/errors.rs

//! Crate-wide error types.
//!
//! Construction errors (`DuplicateTask`, `UnknownTask`, `CyclicDependency`,
//! `BernsteinViolation`) are raised once, while a [`TaskSystem`] is built.
//! `TaskFailed` is the only error a scheduler produces.
//!
//! [`TaskSystem`]: crate::system::TaskSystem

use thiserror::Error;

use crate::system::{Access, ResourceName, TaskName};

#[derive(Error, Debug)]
pub enum TaskSystemError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Duplicate task: {0}")]
    DuplicateTask(TaskName),

    #[error("Unknown task in precedence: {0}")]
    UnknownTask(TaskName),

    #[error("Cycle detected in precedence graph: {}", .cycle.join(" -> "))]
    CyclicDependency { cycle: Vec<TaskName> },

    #[error(
        "Tasks '{first}' and '{second}' violate Bernstein's conditions on {resources:?} \
         and are not ordered by precedence"
    )]
    BernsteinViolation {
        first: TaskName,
        second: TaskName,
        resources: Vec<ResourceName>,
    },

    #[error("Task '{task}' failed: {source}")]
    TaskFailed {
        task: TaskName,
        #[source]
        source: ActionError,
    },

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Failure reported by a task action.
#[derive(Error, Debug)]
pub enum ActionError {
    #[error(transparent)]
    Access(#[from] AccessError),

    #[error("{0}")]
    Failed(String),
}

/// A task touched shared state outside of what it declared.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    #[error("resource '{0}' does not exist in the shared state")]
    UnknownResource(ResourceName),

    #[error("task '{task}' attempted to {access} '{resource}' without declaring it")]
    Undeclared {
        task: TaskName,
        resource: ResourceName,
        access: Access,
    },
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, TaskSystemError>;
