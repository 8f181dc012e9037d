// src/system/mod.rs

//! Validated task systems.
//!
//! - [`task`] defines a single unit of work and its declared accesses.
//! - [`resources`] holds the shared integer cells actions operate on, and
//!   the [`ResourceScope`] that limits an action to its declaration.
//! - [`graph`] indexes the precedence map, rejects unknown names and cycles,
//!   and tracks round-by-round readiness.
//! - [`conflict`] checks Bernstein's conditions for every task pair.
//! - [`task_system`] wires the above together into an immutable
//!   [`TaskSystem`].
//! - [`dot`] renders the precedence graph as Graphviz DOT text.

use std::fmt;

pub mod conflict;
pub mod dot;
pub mod graph;
pub mod resources;
pub mod task;
pub mod task_system;

/// Canonical task name type.
pub type TaskName = String;

/// Canonical resource (shared variable) name type.
pub type ResourceName = String;

/// Kind of access an action performs on a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Access::Read => write!(f, "read"),
            Access::Write => write!(f, "write"),
        }
    }
}

pub use conflict::check_bernstein;
pub use graph::{PrecedenceGraph, Wavefront};
pub use resources::{ResourceScope, SharedState, Snapshot};
pub use task::{Action, Task};
pub use task_system::{Precedence, TaskSystem};
