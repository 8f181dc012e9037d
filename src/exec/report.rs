// src/exec/report.rs

use std::fmt;
use std::time::Duration;

use crate::system::TaskName;
use crate::types::Strategy;

/// Outcome of one scheduler run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub strategy: Strategy,
    /// Tasks grouped as the scheduler executed them: one entry per scan for
    /// the sequential scheduler, one entry per round for the parallel one.
    pub batches: Vec<Vec<TaskName>>,
    pub elapsed: Duration,
}

impl RunReport {
    /// Every executed task, batch by batch.
    pub fn execution_order(&self) -> Vec<&str> {
        self.batches
            .iter()
            .flat_map(|batch| batch.iter().map(|s| s.as_str()))
            .collect()
    }

    /// Index of the batch that executed `task`.
    pub fn batch_of(&self, task: &str) -> Option<usize> {
        self.batches
            .iter()
            .position(|batch| batch.iter().any(|t| t == task))
    }

    pub fn task_count(&self) -> usize {
        self.batches.iter().map(Vec::len).sum()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} execution time: {:.6}s ({} tasks, {} batches)",
            self.strategy,
            self.elapsed.as_secs_f64(),
            self.task_count(),
            self.batches.len()
        )
    }
}
