use std::str::FromStr;
use serde::Deserialize;

/// How the determinism checker treats shared inputs between iterations.
///
/// - `Randomize`: draw fresh values for every shared variable before each
///   iteration (default behaviour). A system that reads an input it never
///   writes will be reported as not deterministic.
/// - `Fixed`: draw the inputs once, then restore that same snapshot before
///   every iteration, so only scheduling can make the results differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputPolicy {
    Randomize,
    Fixed,
}

impl Default for InputPolicy {
    fn default() -> Self {
        InputPolicy::Randomize
    }
}

impl FromStr for InputPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "randomize" | "random" => Ok(InputPolicy::Randomize),
            "fixed" => Ok(InputPolicy::Fixed),
            other => Err(format!(
                "invalid input_policy: {other} (expected \"randomize\" or \"fixed\")"
            )),
        }
    }
}

/// Which scheduling strategy produced a [`RunReport`](crate::exec::RunReport).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Single thread of control, repeated registration-order scans.
    Sequential,
    /// Dependency-ordered rounds with a join barrier between rounds.
    Parallel,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Sequential => write!(f, "sequential"),
            Strategy::Parallel => write!(f, "parallel"),
        }
    }
}
