// tests/cli_run.rs

mod common;
use crate::common::init_tracing;

use std::error::Error;
use std::io::Write;
use std::path::Path;

use clap::Parser;
use tempfile::{tempdir, NamedTempFile};

use bernstein::cli::{CliArgs, Mode};
use bernstein::config::default_config_path;
use bernstein::run;
use bernstein::types::InputPolicy;

type TestResult = Result<(), Box<dyn Error>>;

/// `OUT = BIG + ONE` overflows with the declared inputs. The determinism
/// check randomizes every upper-case input first, so only the sequential and
/// parallel modes hit the overflow.
const OVERFLOWING: &str = r#"
[resources]
BIG = 9223372036854775807
ONE = 1
OUT = 0

[[task]]
name = "overflow"
reads = ["BIG", "ONE"]
writes = ["OUT"]
action = { op = "sum", target = "OUT", operands = ["BIG", "ONE"] }
"#;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

fn args(config: &Path, extra: &[&str]) -> CliArgs {
    let mut argv = vec!["bernstein".to_string(), "--config".to_string()];
    argv.push(config.display().to_string());
    argv.extend(extra.iter().map(|s| s.to_string()));
    CliArgs::try_parse_from(argv).expect("valid arguments")
}

#[test]
fn defaults_match_the_config_loader() -> TestResult {
    let args = CliArgs::try_parse_from(["bernstein"])?;

    assert_eq!(args.config, default_config_path());
    assert_eq!(args.mode, Mode::All);
    assert!(!args.dry_run);
    assert!(args.workers.is_none());
    assert!(args.input_policy.is_none());
    Ok(())
}

#[test]
fn input_policy_flag_is_parsed() -> TestResult {
    let args = CliArgs::try_parse_from(["bernstein", "--input-policy", "fixed", "--seed", "4"])?;
    assert_eq!(args.input_policy, Some(InputPolicy::Fixed));
    assert_eq!(args.seed, Some(4));

    assert!(CliArgs::try_parse_from(["bernstein", "--input-policy", "sometimes"]).is_err());
    Ok(())
}

#[tokio::test]
async fn dry_run_writes_dot_without_executing() -> TestResult {
    crate::common::with_timeout(async {
        init_tracing();

        let file = write_config(OVERFLOWING);
        let dir = tempdir()?;
        let dot_path = dir.path().join("graph.dot");
        let dot_arg = dot_path.display().to_string();

        run(args(file.path(), &["--dry-run", "--dot", &dot_arg])).await?;

        let dot = std::fs::read_to_string(&dot_path)?;
        assert!(dot.starts_with("digraph"));
        assert!(dot.contains("overflow"));

        // The same file fails as soon as the task actually runs.
        let err = run(args(file.path(), &["--mode", "sequential"]))
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("integer overflow"), "{err:#}");
        Ok(())
    })
    .await
}

#[tokio::test]
async fn mode_selects_what_runs() -> TestResult {
    crate::common::with_timeout(async {
        init_tracing();

        let file = write_config(OVERFLOWING);

        run(args(file.path(), &["--mode", "determinism", "--seed", "1", "--iterations", "2"])).await?;

        for mode in ["sequential", "parallel", "cost", "all"] {
            let result = run(args(file.path(), &["--mode", mode])).await;
            assert!(result.is_err(), "--mode {mode} runs the overflowing task");
        }
        Ok(())
    })
    .await
}

#[tokio::test]
async fn zero_count_overrides_are_rejected() {
    init_tracing();

    let file = write_config(OVERFLOWING);

    for flag in ["--workers", "--iterations", "--repetitions"] {
        let err = run(args(file.path(), &["--dry-run", flag, "0"]))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("must be >= 1"), "{flag}: {err}");
    }
}

#[tokio::test]
async fn missing_config_file_names_the_path() {
    init_tracing();

    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope.toml");

    let err = run(args(&missing, &["--dry-run"])).await.unwrap_err();
    assert!(err.to_string().contains("nope.toml"), "{err}");
}
