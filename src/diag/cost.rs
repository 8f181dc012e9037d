// src/diag/cost.rs

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::errors::{Result, TaskSystemError};
use crate::system::{SharedState, TaskSystem};

pub const DEFAULT_REPETITIONS: usize = 5;

/// Alternates sequential and parallel runs and averages their wall-clock
/// time. There is no warm-up and no variance control; the numbers are a
/// rough comparison only.
#[derive(Debug, Clone)]
pub struct CostProfiler {
    repetitions: usize,
}

impl Default for CostProfiler {
    fn default() -> Self {
        Self {
            repetitions: DEFAULT_REPETITIONS,
        }
    }
}

impl CostProfiler {
    pub fn new(repetitions: usize) -> Result<Self> {
        if repetitions == 0 {
            return Err(TaskSystemError::ConfigError(
                "cost measurement needs at least one repetition".to_string(),
            ));
        }
        Ok(Self { repetitions })
    }

    pub fn repetitions(&self) -> usize {
        self.repetitions
    }

    pub async fn measure(&self, system: &TaskSystem, state: &Arc<SharedState>) -> Result<CostReport> {
        let mut sequential = Vec::with_capacity(self.repetitions);
        let mut parallel = Vec::with_capacity(self.repetitions);

        for repetition in 0..self.repetitions {
            let start = Instant::now();
            system.run_sequential(state)?;
            sequential.push(start.elapsed());

            let start = Instant::now();
            system.run_parallel(state).await?;
            parallel.push(start.elapsed());

            debug!(
                repetition,
                sequential_ms = sequential[repetition].as_secs_f64() * 1000.0,
                parallel_ms = parallel[repetition].as_secs_f64() * 1000.0,
                "timed repetition"
            );
        }

        let report = CostReport {
            sequential,
            parallel,
        };
        info!(
            repetitions = self.repetitions,
            mean_sequential_ms = report.mean_sequential().as_secs_f64() * 1000.0,
            mean_parallel_ms = report.mean_parallel().as_secs_f64() * 1000.0,
            "cost measurement finished"
        );
        Ok(report)
    }
}

/// Per-call timings collected by a [`CostProfiler`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostReport {
    pub sequential: Vec<Duration>,
    pub parallel: Vec<Duration>,
}

impl CostReport {
    pub fn mean_sequential(&self) -> Duration {
        mean(&self.sequential)
    }

    pub fn mean_parallel(&self) -> Duration {
        mean(&self.parallel)
    }

    /// Mean sequential time divided by mean parallel time, if the parallel
    /// mean is non-zero.
    pub fn speedup(&self) -> Option<f64> {
        let parallel = self.mean_parallel().as_secs_f64();
        (parallel > 0.0).then(|| self.mean_sequential().as_secs_f64() / parallel)
    }
}

fn mean(samples: &[Duration]) -> Duration {
    if samples.is_empty() {
        return Duration::ZERO;
    }
    let total: Duration = samples.iter().sum();
    match u32::try_from(samples.len()) {
        Ok(count) => total / count,
        Err(_) => Duration::from_secs_f64(total.as_secs_f64() / samples.len() as f64),
    }
}

impl fmt::Display for CostReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "mean sequential time: {:.6}s",
            self.mean_sequential().as_secs_f64()
        )?;
        write!(
            f,
            "mean parallel time: {:.6}s",
            self.mean_parallel().as_secs_f64()
        )?;
        if let Some(speedup) = self.speedup() {
            write!(f, " (speedup x{speedup:.2})")?;
        }
        Ok(())
    }
}
