// src/system/conflict.rs

//! Bernstein's conditions.
//!
//! Two tasks may run concurrently only if neither writes what the other
//! reads and they do not write the same resource. Any pair that breaks this
//! must be ordered by a *direct* precedence edge; a path through an
//! intermediate task is not enough.
//!
//! The scan is O(n²) over task pairs, which is fine for the small static
//! task sets this crate targets but would need an index by resource to
//! scale.

use tracing::{debug, warn};

use crate::errors::{Result, TaskSystemError};
use crate::system::graph::PrecedenceGraph;
use crate::system::task::Task;

/// Check every unordered pair of tasks, in registration order, and fail on
/// the first conflicting pair without a direct precedence edge.
///
/// `tasks[i]` must be the task at index `i` of `graph`.
pub fn check_bernstein<T: AsRef<Task>>(tasks: &[T], graph: &PrecedenceGraph) -> Result<()> {
    for i in 0..tasks.len() {
        for j in (i + 1)..tasks.len() {
            let (first, second) = (tasks[i].as_ref(), tasks[j].as_ref());
            let resources = first.conflicts_with(second);
            if resources.is_empty() {
                continue;
            }

            if graph.directly_ordered(i, j) {
                debug!(
                    first = %first.name(),
                    second = %second.name(),
                    ?resources,
                    "conflicting pair is ordered by precedence"
                );
                continue;
            }

            warn!(
                first = %first.name(),
                second = %second.name(),
                ?resources,
                "unordered tasks violate Bernstein's conditions"
            );
            return Err(TaskSystemError::BernsteinViolation {
                first: first.name().to_string(),
                second: second.name().to_string(),
                resources,
            });
        }
    }
    Ok(())
}
