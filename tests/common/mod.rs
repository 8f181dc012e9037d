#![allow(dead_code)]

pub use bernstein_test_utils::{builders, init_tracing, recorder, scenarios, with_timeout};

use bernstein::errors::TaskSystemError;

/// Names of the two tasks in a Bernstein violation, sorted.
pub fn violation_pair(err: &TaskSystemError) -> Option<(String, String)> {
    match err {
        TaskSystemError::BernsteinViolation { first, second, .. } => {
            let mut pair = [first.clone(), second.clone()];
            pair.sort();
            let [a, b] = pair;
            Some((a, b))
        }
        _ => None,
    }
}
