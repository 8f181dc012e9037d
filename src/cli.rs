// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::default_config_path;
use crate::types::InputPolicy;

/// Command-line arguments for `bernstein`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "bernstein",
    version,
    about = "Validate a task system against Bernstein's conditions and run it sequentially or in parallel rounds.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the task system file (TOML).
    ///
    /// Default: `Tasks.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value_os_t = default_config_path())]
    pub config: PathBuf,

    /// What to run after validation.
    #[arg(long, value_enum, default_value_t = Mode::All)]
    pub mode: Mode,

    /// Maximum number of concurrently running tasks (overrides `[config].workers`).
    #[arg(long, value_name = "N")]
    pub workers: Option<usize>,

    /// Parallel runs compared by the determinism check (overrides `[config].iterations`).
    #[arg(long, value_name = "N")]
    pub iterations: Option<usize>,

    /// Sequential/parallel pairs timed by the cost measurement
    /// (overrides `[config].repetitions`).
    #[arg(long, value_name = "N")]
    pub repetitions: Option<usize>,

    /// `randomize` or `fixed` (overrides `[config].input_policy`).
    #[arg(long, value_name = "POLICY")]
    pub input_policy: Option<InputPolicy>,

    /// Seed for the determinism check's input generator.
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Write the precedence graph as Graphviz DOT to this path.
    #[arg(long, value_name = "PATH")]
    pub dot: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `BERNSTEIN_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print tasks and rounds, but don't execute anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Which operations to run.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    Sequential,
    Parallel,
    Determinism,
    Cost,
    /// Sequential, parallel, determinism and cost, in that order.
    All,
}

impl Mode {
    pub fn includes(self, other: Mode) -> bool {
        self == Mode::All || self == other
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
