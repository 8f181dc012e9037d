// src/lib.rs

pub mod cli;
pub mod config;
pub mod diag;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod system;
pub mod types;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::cli::{CliArgs, Mode};
use crate::config::loader::load_and_validate;
use crate::config::model::ConfigFile;
use crate::diag::{CostProfiler, DeterminismChecker};
use crate::system::{SharedState, TaskSystem};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and CLI overrides
/// - task system construction (precedence + Bernstein validation)
/// - optional DOT export
/// - the sequential / parallel runs and the diagnostics selected by `--mode`
pub async fn run(args: CliArgs) -> Result<()> {
    let mut cfg = load_and_validate(&args.config)
        .with_context(|| format!("loading task system from {}", args.config.display()))?;
    apply_overrides(&mut cfg, &args)?;

    let system = TaskSystem::from_config(&cfg)?;

    if let Some(ref path) = args.dot {
        std::fs::write(path, crate::system::dot::to_dot(&system))
            .with_context(|| format!("writing DOT graph to {}", path.display()))?;
        info!(path = %path.display(), "wrote precedence graph");
    }

    if args.dry_run {
        print_dry_run(&cfg, &system);
        return Ok(());
    }

    let state = Arc::new(SharedState::from_config(&cfg));

    if args.mode.includes(Mode::Sequential) {
        println!("--- sequential execution ---");
        let report = system.run_sequential(&state)?;
        println!("{report}");
        print_state(&state);
    }

    if args.mode.includes(Mode::Parallel) {
        println!("--- parallel execution ---");
        let report = system.run_parallel(&state).await?;
        println!("{report}");
        print_state(&state);
    }

    if args.mode.includes(Mode::Determinism) {
        println!("--- determinism check ---");
        let mut checker =
            DeterminismChecker::new(cfg.config.iterations)?.with_policy(cfg.config.input_policy);
        if let Some(seed) = cfg.config.seed {
            checker = checker.with_seed(seed);
        }
        let report = checker.check(&system, &state).await?;
        println!("{report}");
    }

    if args.mode.includes(Mode::Cost) {
        println!("--- parallelism cost ---");
        let report = CostProfiler::new(cfg.config.repetitions)?
            .measure(&system, &state)
            .await?;
        println!("{report}");
    }

    Ok(())
}

/// CLI flags take precedence over the `[config]` section.
fn apply_overrides(cfg: &mut ConfigFile, args: &CliArgs) -> Result<()> {
    if let Some(workers) = args.workers {
        anyhow::ensure!(workers >= 1, "--workers must be >= 1 (got 0)");
        cfg.config.workers = Some(workers);
    }
    if let Some(iterations) = args.iterations {
        anyhow::ensure!(iterations >= 1, "--iterations must be >= 1 (got 0)");
        cfg.config.iterations = iterations;
    }
    if let Some(repetitions) = args.repetitions {
        anyhow::ensure!(repetitions >= 1, "--repetitions must be >= 1 (got 0)");
        cfg.config.repetitions = repetitions;
    }
    if let Some(policy) = args.input_policy {
        cfg.config.input_policy = policy;
    }
    if let Some(seed) = args.seed {
        cfg.config.seed = Some(seed);
    }
    debug!(config = ?cfg.config, "effective configuration");
    Ok(())
}

fn print_state(state: &SharedState) {
    let values: Vec<String> = state
        .names()
        .filter_map(|name| state.get(name).map(|v| format!("{name}={v}")))
        .collect();
    println!("state: {}", values.join(", "));
}

/// Dry-run output: tasks, their accesses and prerequisites, and rounds.
fn print_dry_run(cfg: &ConfigFile, system: &TaskSystem) {
    println!("bernstein dry-run");
    println!(
        "  config.workers = {}",
        cfg.config
            .workers
            .map(|w| w.to_string())
            .unwrap_or_else(|| format!("auto ({})", system.workers()))
    );
    println!("  config.iterations = {}", cfg.config.iterations);
    println!("  config.repetitions = {}", cfg.config.repetitions);
    println!("  config.input_policy = {:?}", cfg.config.input_policy);
    println!();

    println!("resources ({}):", cfg.resources.len());
    for (name, value) in cfg.resources.iter() {
        println!("  - {name} = {value}");
    }
    println!();

    println!("tasks ({}):", system.len());
    for task in system.tasks() {
        println!("  - {}", task.name());
        if !task.read_set().is_empty() {
            println!("      reads: {:?}", task.read_set());
        }
        if !task.write_set().is_empty() {
            println!("      writes: {:?}", task.write_set());
        }
        let prerequisites = system.prerequisites_of(task.name());
        if !prerequisites.is_empty() {
            println!("      after: {:?}", prerequisites);
        }
        if !task.has_action() {
            println!("      action: none");
        }
    }
    println!();

    println!("rounds:");
    for (i, round) in system.rounds().iter().enumerate() {
        println!("  {i}: {round:?}");
    }

    debug!("dry-run complete (no execution)");
}
