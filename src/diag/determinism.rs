// src/diag/determinism.rs

use std::fmt;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::errors::{Result, TaskSystemError};
use crate::system::{SharedState, Snapshot, TaskSystem};
use crate::types::InputPolicy;

/// Number of parallel runs compared by default.
pub const DEFAULT_ITERATIONS: usize = 5;

/// Inclusive range random inputs are drawn from.
const INPUT_RANGE: std::ops::RangeInclusive<i64> = 1..=100;

/// Runs the parallel scheduler several times and checks that the shared
/// variables always end up with the same values.
///
/// Which inputs each iteration starts from depends on the [`InputPolicy`]:
/// with `Randomize`, a difference may come from the inputs as well as from
/// scheduling.
#[derive(Debug, Clone)]
pub struct DeterminismChecker {
    iterations: usize,
    policy: InputPolicy,
    seed: Option<u64>,
}

impl Default for DeterminismChecker {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            policy: InputPolicy::default(),
            seed: None,
        }
    }
}

impl DeterminismChecker {
    pub fn new(iterations: usize) -> Result<Self> {
        if iterations == 0 {
            return Err(TaskSystemError::ConfigError(
                "determinism check needs at least one iteration".to_string(),
            ));
        }
        Ok(Self {
            iterations,
            ..Self::default()
        })
    }

    pub fn with_policy(mut self, policy: InputPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Seed the input generator so that runs are reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn policy(&self) -> InputPolicy {
        self.policy
    }

    pub async fn check(
        &self,
        system: &TaskSystem,
        state: &Arc<SharedState>,
    ) -> Result<DeterminismReport> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let fixed_inputs = match self.policy {
            InputPolicy::Fixed => {
                randomize(state, &mut rng)?;
                Some(state.snapshot())
            }
            InputPolicy::Randomize => None,
        };

        let mut snapshots = Vec::with_capacity(self.iterations);
        for iteration in 0..self.iterations {
            match &fixed_inputs {
                Some(inputs) => state.restore(inputs).map_err(access_to_error)?,
                None => randomize(state, &mut rng)?,
            }

            system.run_parallel(state).await?;

            let snapshot = state.snapshot();
            debug!(iteration, ?snapshot, "recorded post-run snapshot");
            snapshots.push(snapshot);
        }

        let report = DeterminismReport {
            policy: self.policy,
            snapshots,
        };
        info!(
            iterations = self.iterations,
            policy = ?self.policy,
            deterministic = report.is_deterministic(),
            "determinism check finished"
        );
        Ok(report)
    }
}

fn randomize(state: &SharedState, rng: &mut StdRng) -> Result<()> {
    for name in state.shared_names() {
        state
            .set(name, rng.gen_range(INPUT_RANGE))
            .map_err(access_to_error)?;
    }
    Ok(())
}

fn access_to_error(err: crate::errors::AccessError) -> TaskSystemError {
    TaskSystemError::Other(err.into())
}

/// Snapshots recorded by a [`DeterminismChecker`], one per iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismReport {
    pub policy: InputPolicy,
    pub snapshots: Vec<Snapshot>,
}

impl DeterminismReport {
    /// `true` if every iteration left the shared variables identical.
    pub fn is_deterministic(&self) -> bool {
        self.snapshots.windows(2).all(|pair| pair[0] == pair[1])
    }
}

impl fmt::Display for DeterminismReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_deterministic() {
            write!(f, "the task system is deterministic")
        } else {
            write!(f, "the task system is not deterministic")
        }
    }
}
