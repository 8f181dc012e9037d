// src/system/task_system.rs

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use tracing::info;

use crate::config::model::ConfigFile;
use crate::errors::Result;
use crate::exec::{ParallelScheduler, RunReport, SequentialScheduler};
use crate::system::conflict::check_bernstein;
use crate::system::graph::PrecedenceGraph;
use crate::system::resources::SharedState;
use crate::system::task::Task;
use crate::system::TaskName;

/// Map from task name to the names of its direct prerequisites.
///
/// Tasks without an entry have no prerequisites. Entries are kept sorted by
/// task name, whatever order they were inserted in, so when several entries
/// name unknown tasks, the one reported by [`TaskSystem::new`] is the first
/// in name order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Precedence {
    entries: BTreeMap<TaskName, BTreeSet<TaskName>>,
}

impl Precedence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `prerequisites` to the entry for `task`.
    pub fn with<I, S>(mut self, task: impl Into<TaskName>, prerequisites: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<TaskName>,
    {
        self.insert(task, prerequisites);
        self
    }

    pub fn insert<I, S>(&mut self, task: impl Into<TaskName>, prerequisites: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<TaskName>,
    {
        self.entries
            .entry(task.into())
            .or_default()
            .extend(prerequisites.into_iter().map(Into::into));
    }

    pub fn get(&self, task: &str) -> Option<&BTreeSet<TaskName>> {
        self.entries.get(task)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TaskName, &BTreeSet<TaskName>)> {
        self.entries.iter()
    }

}

impl<K, I, S> FromIterator<(K, I)> for Precedence
where
    K: Into<TaskName>,
    I: IntoIterator<Item = S>,
    S: Into<TaskName>,
{
    fn from_iter<T: IntoIterator<Item = (K, I)>>(iter: T) -> Self {
        let mut precedence = Precedence::new();
        for (task, prerequisites) in iter {
            precedence.insert(task, prerequisites);
        }
        precedence
    }
}

/// Validated, immutable set of tasks plus their precedence graph.
///
/// Construction checks, in order: unique names, known names in the
/// precedence map, acyclicity, and Bernstein's conditions. None of these are
/// re-checked when scheduling.
#[derive(Debug, Clone)]
pub struct TaskSystem {
    tasks: Vec<Arc<Task>>,
    graph: PrecedenceGraph,
    workers: usize,
}

impl TaskSystem {
    /// Validate `tasks` against `precedence`. Registration order is the
    /// order of `tasks`.
    pub fn new(tasks: impl IntoIterator<Item = Task>, precedence: Precedence) -> Result<Self> {
        let tasks: Vec<Arc<Task>> = tasks.into_iter().map(Arc::new).collect();
        let names = tasks.iter().map(|t| t.name().to_string()).collect();

        let graph = PrecedenceGraph::build(names, &precedence)?;
        check_bernstein(&tasks, &graph)?;

        info!(tasks = tasks.len(), "task system validated");

        Ok(Self {
            tasks,
            graph,
            workers: default_workers(),
        })
    }

    /// Build a task system from a validated [`ConfigFile`].
    ///
    /// Each `[[task]]` entry's `after` list becomes its precedence entry.
    pub fn from_config(cfg: &ConfigFile) -> Result<Self> {
        let tasks: Vec<Task> = cfg.task.iter().map(Task::from_config).collect();
        let precedence: Precedence = cfg
            .task
            .iter()
            .filter(|t| !t.after.is_empty())
            .map(|t| (t.name.clone(), t.after.clone()))
            .collect();

        let system = Self::new(tasks, precedence)?;
        Ok(match cfg.config.workers {
            Some(workers) => system.with_workers(workers),
            None => system,
        })
    }

    /// Cap on concurrently running actions in the parallel scheduler.
    /// Values below one are raised to one.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Tasks in registration order.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter().map(|t| t.as_ref())
    }

    pub fn task(&self, name: &str) -> Option<&Task> {
        let idx = self.graph.index_of(name)?;
        Some(self.tasks[idx].as_ref())
    }

    pub(crate) fn task_at(&self, idx: usize) -> &Arc<Task> {
        &self.tasks[idx]
    }

    pub fn graph(&self) -> &PrecedenceGraph {
        &self.graph
    }

    /// Direct prerequisites of `task`, in registration order.
    pub fn prerequisites_of(&self, task: &str) -> Vec<&str> {
        match self.graph.index_of(task) {
            Some(idx) => self
                .graph
                .dependencies_of(idx)
                .iter()
                .map(|&d| self.graph.name(d))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Round assignment used by the parallel scheduler.
    pub fn rounds(&self) -> Vec<Vec<&str>> {
        self.graph
            .rounds()
            .into_iter()
            .map(|round| round.into_iter().map(|idx| self.graph.name(idx)).collect())
            .collect()
    }

    /// Run every task once on the calling thread.
    pub fn run_sequential(&self, state: &SharedState) -> Result<RunReport> {
        SequentialScheduler::new(self).run(state)
    }

    /// Run every task once, round by round, with up to
    /// [`workers`](Self::workers) actions in flight.
    pub async fn run_parallel(&self, state: &Arc<SharedState>) -> Result<RunReport> {
        ParallelScheduler::new(self).run(state).await
    }
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
