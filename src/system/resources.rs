// src/system/resources.rs

//! Shared resource store and per-task access scopes.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::config::model::ConfigFile;
use crate::errors::AccessError;
use crate::system::task::Task;
use crate::system::{Access, ResourceName};

/// Post-run values of the shared variables, keyed by name.
pub type Snapshot = BTreeMap<ResourceName, i64>;

/// Fixed set of named integer cells that task actions read and write.
///
/// The key set never changes after construction. Cells are atomics so the
/// store can be handed to concurrently running actions without a lock; the
/// ordering between conflicting accesses comes from precedence and the
/// parallel scheduler's round barrier, not from the store.
#[derive(Debug, Default)]
pub struct SharedState {
    cells: BTreeMap<ResourceName, AtomicI64>,
}

impl SharedState {
    pub fn new<I, K>(initial: I) -> Self
    where
        I: IntoIterator<Item = (K, i64)>,
        K: Into<ResourceName>,
    {
        let cells = initial
            .into_iter()
            .map(|(name, value)| (name.into(), AtomicI64::new(value)))
            .collect();
        Self { cells }
    }

    /// Shared state holding the `[resources]` of a config with their
    /// initial values.
    pub fn from_config(cfg: &ConfigFile) -> Self {
        Self::new(cfg.resources.iter().map(|(name, value)| (name.clone(), *value)))
    }

    /// Current value of a resource, or `None` if it does not exist.
    pub fn get(&self, name: &str) -> Option<i64> {
        self.cells.get(name).map(|cell| cell.load(Ordering::Acquire))
    }

    /// Unscoped write, used by diagnostics and test setup.
    pub fn set(&self, name: &str, value: i64) -> Result<(), AccessError> {
        let cell = self
            .cells
            .get(name)
            .ok_or_else(|| AccessError::UnknownResource(name.to_string()))?;
        cell.store(value, Ordering::Release);
        Ok(())
    }

    /// All resource names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(|s| s.as_str())
    }

    /// Names of the externally shared variables: those written in upper case
    /// (at least one letter, no lower-case letters). Other cells are treated
    /// as private scratch space by the determinism checker.
    pub fn shared_names(&self) -> impl Iterator<Item = &str> {
        self.names().filter(|name| is_shared_name(name))
    }

    /// Values of every shared variable.
    pub fn snapshot(&self) -> Snapshot {
        self.shared_names()
            .filter_map(|name| self.get(name).map(|v| (name.to_string(), v)))
            .collect()
    }

    /// Write back a snapshot taken earlier. Names missing from the store are
    /// rejected.
    pub fn restore(&self, snapshot: &Snapshot) -> Result<(), AccessError> {
        for (name, value) in snapshot {
            self.set(name, *value)?;
        }
        Ok(())
    }

    /// Accessor limited to what `task` declared.
    pub fn scope<'a>(&'a self, task: &'a Task) -> ResourceScope<'a> {
        ResourceScope { task, state: self }
    }
}

fn is_shared_name(name: &str) -> bool {
    name.chars().any(char::is_alphabetic) && !name.chars().any(char::is_lowercase)
}

/// View of the shared state handed to a task action.
///
/// Reads are allowed on anything the task declared in `reads` or `writes`;
/// writes only on `writes`. Anything else fails with
/// [`AccessError::Undeclared`] instead of silently racing with another task.
#[derive(Debug, Clone, Copy)]
pub struct ResourceScope<'a> {
    task: &'a Task,
    state: &'a SharedState,
}

impl<'a> ResourceScope<'a> {
    pub fn task_name(&self) -> &str {
        self.task.name()
    }

    pub fn read(&self, resource: &str) -> Result<i64, AccessError> {
        if !self.task.read_set().contains(resource) && !self.task.write_set().contains(resource) {
            return Err(self.undeclared(resource, Access::Read));
        }
        self.state
            .get(resource)
            .ok_or_else(|| AccessError::UnknownResource(resource.to_string()))
    }

    pub fn write(&self, resource: &str, value: i64) -> Result<(), AccessError> {
        if !self.task.write_set().contains(resource) {
            return Err(self.undeclared(resource, Access::Write));
        }
        self.state.set(resource, value)
    }

    fn undeclared(&self, resource: &str, access: Access) -> AccessError {
        AccessError::Undeclared {
            task: self.task.name().to_string(),
            resource: resource.to_string(),
            access,
        }
    }
}
