// src/exec/parallel.rs

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::errors::{Result, TaskSystemError};
use crate::exec::report::RunReport;
use crate::system::{SharedState, TaskName, TaskSystem};
use crate::types::Strategy;

/// Runs tasks in dependency-ordered rounds.
///
/// Each round is every task whose prerequisites have all completed. Its
/// actions are queued onto Tokio's blocking pool, at most `workers` at a
/// time, and the round is joined before the next ready set is computed, so
/// tasks from different rounds never overlap.
///
/// A failing action aborts the round. The worker semaphore is closed so that
/// queued actions never start, every action already running is joined, and
/// only then is the first error returned; no further round starts. The
/// shared state is therefore final when `run` returns, on success or
/// failure. A panicking action resumes unwinding in the caller, also after
/// the round has drained.
#[derive(Debug, Clone, Copy)]
pub struct ParallelScheduler<'a> {
    system: &'a TaskSystem,
    workers: usize,
}

impl<'a> ParallelScheduler<'a> {
    pub fn new(system: &'a TaskSystem) -> Self {
        Self {
            system,
            workers: system.workers(),
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub async fn run(&self, state: &Arc<SharedState>) -> Result<RunReport> {
        let start = Instant::now();
        let graph = self.system.graph();
        let permits = Arc::new(Semaphore::new(self.workers));

        let mut wavefront = graph.wavefront();
        let mut rounds: Vec<Vec<TaskName>> = Vec::new();

        while !wavefront.is_finished() {
            let ready = wavefront.ready();
            if ready.is_empty() {
                return Err(TaskSystemError::Other(anyhow::anyhow!(
                    "no task is ready but the run is not finished"
                )));
            }

            let names: Vec<TaskName> = ready
                .iter()
                .map(|&idx| graph.name(idx).to_string())
                .collect();
            debug!(round = rounds.len(), tasks = ?names, "starting round");

            self.run_round(&ready, state, &permits).await?;

            wavefront.complete(&ready);
            rounds.push(names);
        }

        let elapsed = start.elapsed();
        info!(
            rounds = rounds.len(),
            workers = self.workers,
            elapsed_ms = elapsed.as_secs_f64() * 1000.0,
            "parallel run finished"
        );

        Ok(RunReport {
            strategy: Strategy::Parallel,
            batches: rounds,
            elapsed,
        })
    }

    /// Launch every task in `ready` and wait for all of them.
    ///
    /// Returns only once no action of this round is still running.
    async fn run_round(
        &self,
        ready: &[usize],
        state: &Arc<SharedState>,
        permits: &Arc<Semaphore>,
    ) -> Result<()> {
        let mut round: JoinSet<Result<()>> = JoinSet::new();

        for &idx in ready {
            let task = Arc::clone(self.system.task_at(idx));
            let state = Arc::clone(state);
            let permits = Arc::clone(permits);

            round.spawn(async move {
                // Closed once the round has failed.
                let Ok(_permit) = permits.acquire_owned().await else {
                    debug!(task = %task.name(), "round aborted; task not started");
                    return Ok(());
                };

                match tokio::task::spawn_blocking(move || {
                    debug!(task = %task.name(), "executing task");
                    task.execute(&state)
                })
                .await
                {
                    Ok(outcome) => outcome,
                    Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
                    Err(err) => Err(TaskSystemError::Other(err.into())),
                }
            });
        }

        let mut failure: Option<TaskSystemError> = None;
        let mut panic = None;

        while let Some(joined) = round.join_next().await {
            match joined {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    if failure.is_none() {
                        warn!(error = %err, "task failed; draining round");
                        permits.close();
                        failure = Some(err);
                    } else {
                        debug!(error = %err, "further failure in aborted round");
                    }
                }
                Err(err) if err.is_panic() => {
                    permits.close();
                    panic.get_or_insert(err.into_panic());
                }
                Err(err) => {
                    permits.close();
                    failure.get_or_insert(TaskSystemError::Other(err.into()));
                }
            }
        }

        if let Some(payload) = panic {
            std::panic::resume_unwind(payload);
        }
        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
