// src/exec/sequential.rs

use std::time::Instant;

use tracing::{debug, info};

use crate::errors::{Result, TaskSystemError};
use crate::exec::report::RunReport;
use crate::system::{SharedState, TaskName, TaskSystem};
use crate::types::Strategy;

/// Runs every task exactly once on the calling thread.
///
/// Each pass scans all tasks in registration order and executes any pending
/// task whose prerequisites have all executed, including ones executed
/// earlier in the same pass. Passes repeat until every task has run; since
/// the graph is acyclic, every pass makes progress.
#[derive(Debug, Clone, Copy)]
pub struct SequentialScheduler<'a> {
    system: &'a TaskSystem,
}

impl<'a> SequentialScheduler<'a> {
    pub fn new(system: &'a TaskSystem) -> Self {
        Self { system }
    }

    pub fn run(&self, state: &SharedState) -> Result<RunReport> {
        let start = Instant::now();
        let graph = self.system.graph();
        let total = graph.len();

        let mut executed = vec![false; total];
        let mut executed_count = 0;
        let mut passes: Vec<Vec<TaskName>> = Vec::new();

        while executed_count < total {
            let mut pass = Vec::new();

            for idx in 0..total {
                if executed[idx] {
                    continue;
                }
                if !graph.dependencies_of(idx).iter().all(|&dep| executed[dep]) {
                    continue;
                }

                let task = self.system.task_at(idx);
                debug!(task = %task.name(), pass = passes.len(), "executing task");
                task.execute(state)?;

                executed[idx] = true;
                executed_count += 1;
                pass.push(task.name().to_string());
            }

            if pass.is_empty() {
                return Err(TaskSystemError::Other(anyhow::anyhow!(
                    "sequential scan made no progress with {} task(s) pending",
                    total - executed_count
                )));
            }
            passes.push(pass);
        }

        let elapsed = start.elapsed();
        info!(
            passes = passes.len(),
            elapsed_ms = elapsed.as_secs_f64() * 1000.0,
            "sequential run finished"
        );

        Ok(RunReport {
            strategy: Strategy::Sequential,
            batches: passes,
            elapsed,
        })
    }
}
