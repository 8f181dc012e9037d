// src/system/task.rs

//! A single unit of work and its declared resource accesses.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::trace;

use crate::config::model::{ActionSpec, TaskConfig};
use crate::errors::{ActionError, Result, TaskSystemError};
use crate::system::resources::{ResourceScope, SharedState};
use crate::system::{ResourceName, TaskName};

/// Side-effecting body of a task.
///
/// The scope only lets the action touch the resources its task declared.
/// Actions that ignore the scope and reach external state some other way are
/// trusted to stay within the declaration.
pub type Action = Arc<dyn Fn(&ResourceScope<'_>) -> std::result::Result<(), ActionError> + Send + Sync>;

/// Immutable description of one task.
#[derive(Clone)]
pub struct Task {
    name: TaskName,
    reads: BTreeSet<ResourceName>,
    writes: BTreeSet<ResourceName>,
    action: Option<Action>,
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("reads", &self.reads)
            .field("writes", &self.writes)
            .field("action", &self.action.is_some())
            .finish()
    }
}

impl Task {
    /// A task with no declared accesses and no action.
    pub fn new(name: impl Into<TaskName>) -> Self {
        Self {
            name: name.into(),
            reads: BTreeSet::new(),
            writes: BTreeSet::new(),
            action: None,
        }
    }

    pub fn reads<I, S>(mut self, resources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ResourceName>,
    {
        self.reads.extend(resources.into_iter().map(Into::into));
        self
    }

    pub fn writes<I, S>(mut self, resources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ResourceName>,
    {
        self.writes.extend(resources.into_iter().map(Into::into));
        self
    }

    pub fn action<F>(mut self, action: F) -> Self
    where
        F: Fn(&ResourceScope<'_>) -> std::result::Result<(), ActionError> + Send + Sync + 'static,
    {
        self.action = Some(Arc::new(action));
        self
    }

    /// Build a task from a `[[task]]` config entry.
    ///
    /// `delay_ms` is applied before the configured action runs.
    pub fn from_config(cfg: &TaskConfig) -> Self {
        let task = Task::new(cfg.name.clone())
            .reads(cfg.reads.iter().cloned())
            .writes(cfg.writes.iter().cloned());

        if cfg.action.is_none() && cfg.delay_ms.is_none() {
            return task;
        }

        let spec = cfg.action.clone();
        let delay = cfg.delay_ms.map(Duration::from_millis);
        task.action(move |scope| {
            if let Some(delay) = delay {
                std::thread::sleep(delay);
            }
            match &spec {
                Some(spec) => apply_action_spec(spec, scope),
                None => Ok(()),
            }
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn read_set(&self) -> &BTreeSet<ResourceName> {
        &self.reads
    }

    pub fn write_set(&self) -> &BTreeSet<ResourceName> {
        &self.writes
    }

    pub fn has_action(&self) -> bool {
        self.action.is_some()
    }

    /// Resources on which `self` and `other` conflict under Bernstein's
    /// conditions: `(W1 ∩ R2) ∪ (R1 ∩ W2) ∪ (W1 ∩ W2)`, sorted.
    pub fn conflicts_with(&self, other: &Task) -> Vec<ResourceName> {
        let mut conflict: BTreeSet<&ResourceName> = BTreeSet::new();
        conflict.extend(self.writes.intersection(&other.reads));
        conflict.extend(self.reads.intersection(&other.writes));
        conflict.extend(self.writes.intersection(&other.writes));
        conflict.into_iter().cloned().collect()
    }

    /// Run the action against `state`. A task without an action is a no-op.
    pub fn execute(&self, state: &SharedState) -> Result<()> {
        let Some(action) = &self.action else {
            trace!(task = %self.name, "task has no action; nothing to do");
            return Ok(());
        };

        (**action)(&state.scope(self)).map_err(|source| TaskSystemError::TaskFailed {
            task: self.name.clone(),
            source,
        })
    }
}

fn apply_action_spec(
    spec: &ActionSpec,
    scope: &ResourceScope<'_>,
) -> std::result::Result<(), ActionError> {
    match spec {
        ActionSpec::Set { target, value } => {
            scope.write(target, *value)?;
        }
        ActionSpec::Sum { target, operands } => {
            let mut total: i64 = 0;
            for operand in operands {
                let value = scope.read(operand)?;
                total = total.checked_add(value).ok_or_else(|| {
                    ActionError::Failed(format!("integer overflow while summing into '{target}'"))
                })?;
            }
            scope.write(target, total)?;
        }
        ActionSpec::Sleep { millis } => {
            std::thread::sleep(Duration::from_millis(*millis));
        }
    }
    Ok(())
}
