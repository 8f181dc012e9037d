// src/exec/mod.rs

//! Execution strategies for a validated [`TaskSystem`](crate::system::TaskSystem).
//!
//! - [`sequential`] runs every task on the calling thread, scanning tasks in
//!   registration order until all have run.
//! - [`parallel`] runs tasks in rounds on Tokio's blocking pool, with a
//!   bounded number of actions in flight and a join barrier between rounds.
//! - [`report`] describes what a run did and how long it took.
//!
//! Neither strategy takes a lock on the shared state: tasks that may run at
//! the same time were proven conflict-free when the system was built.

pub mod parallel;
pub mod report;
pub mod sequential;

pub use parallel::ParallelScheduler;
pub use report::RunReport;
pub use sequential::SequentialScheduler;
