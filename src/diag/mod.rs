// src/diag/mod.rs

//! Diagnostic drivers that run the schedulers repeatedly.
//!
//! - [`determinism`] reruns the parallel scheduler and compares the shared
//!   variables it leaves behind.
//! - [`cost`] times the sequential scheduler against the parallel one.

pub mod cost;
pub mod determinism;

pub use cost::{CostProfiler, CostReport};
pub use determinism::{DeterminismChecker, DeterminismReport};
