// tests/happens_before.rs

mod common;
use crate::common::init_tracing;
use crate::common::recorder::{EventLog, Phase};

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use bernstein::exec::{ParallelScheduler, SequentialScheduler};
use bernstein::system::{Precedence, SharedState, TaskSystem};

type TestResult = Result<(), Box<dyn Error>>;

/// Diamond A -> {B, C} -> D plus an unrelated E, registered in reverse
/// dependency order so that the sequential scheduler needs several scans.
fn diamond(log: &EventLog, pause: Duration) -> TaskSystem {
    let tasks = vec![
        log.task("D", pause),
        log.task("C", pause),
        log.task("B", pause),
        log.task("A", pause),
        log.task("E", pause),
    ];
    let precedence = Precedence::new()
        .with("B", ["A"])
        .with("C", ["A"])
        .with("D", ["B", "C"]);
    TaskSystem::new(tasks, precedence).expect("diamond is valid")
}

#[test]
fn sequential_scans_respect_prerequisites() -> TestResult {
    init_tracing();

    let log = EventLog::new();
    let system = diamond(&log, Duration::ZERO);
    let state = SharedState::default();

    let report = system.run_sequential(&state)?;

    assert_eq!(
        report.batches,
        vec![
            vec!["A".to_string(), "E".to_string()],
            vec!["C".to_string(), "B".to_string()],
            vec!["D".to_string()],
        ]
    );
    log.assert_happens_before(&system);
    for name in ["A", "B", "C", "D", "E"] {
        assert_eq!(log.starts_of(name), 1, "{name} must run exactly once");
    }
    Ok(())
}

#[tokio::test]
async fn parallel_rounds_respect_prerequisites_and_never_overlap() -> TestResult {
    crate::common::with_timeout(async {
        init_tracing();

        let log = EventLog::new();
        let system = diamond(&log, Duration::from_millis(20)).with_workers(4);
        let state = Arc::new(SharedState::default());

        let report = system.run_parallel(&state).await?;

        assert_eq!(
            report.batches,
            vec![
                vec!["A".to_string(), "E".to_string()],
                vec!["C".to_string(), "B".to_string()],
                vec!["D".to_string()],
            ]
        );
        log.assert_happens_before(&system);

        for (i, earlier) in report.batches.iter().enumerate() {
            for later in report.batches.iter().skip(i + 1) {
                for a in earlier {
                    for b in later {
                        assert!(!log.overlapped(a, b), "{a} and {b} are in different rounds");
                        assert!(
                            log.position(a, Phase::End) < log.position(b, Phase::Start),
                            "{a} must end before {b} starts"
                        );
                    }
                }
            }
        }
        Ok(())
    })
    .await
}

#[tokio::test]
async fn tasks_in_the_same_round_run_concurrently() -> TestResult {
    crate::common::with_timeout(async {
        init_tracing();

        let log = EventLog::new();
        let system = diamond(&log, Duration::from_millis(150)).with_workers(4);
        let state = Arc::new(SharedState::default());

        system.run_parallel(&state).await?;

        assert!(log.overlapped("B", "C"), "B and C share round 1");
        assert!(log.overlapped("A", "E"), "A and E share round 0");
        Ok(())
    })
    .await
}

#[tokio::test]
async fn single_worker_serializes_each_round() -> TestResult {
    crate::common::with_timeout(async {
        init_tracing();

        let log = EventLog::new();
        let system = diamond(&log, Duration::from_millis(20)).with_workers(1);
        let state = Arc::new(SharedState::default());

        let report = system.run_parallel(&state).await?;

        assert_eq!(report.batches.len(), 3);
        assert!(!log.overlapped("B", "C"));
        assert!(!log.overlapped("A", "E"));
        log.assert_happens_before(&system);
        Ok(())
    })
    .await
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn happens_before_holds_across_repeated_runs() -> TestResult {
    crate::common::with_timeout(async {
        init_tracing();

        let log = EventLog::new();
        let system = diamond(&log, Duration::from_millis(1)).with_workers(4);
        let state = Arc::new(SharedState::default());

        for _ in 0..10 {
            log.clear();
            system.run_parallel(&state).await?;
            log.assert_happens_before(&system);

            log.clear();
            system.run_sequential(&state)?;
            log.assert_happens_before(&system);
        }
        Ok(())
    })
    .await
}

#[tokio::test]
async fn long_chain_runs_one_task_per_round() -> TestResult {
    crate::common::with_timeout(async {
        init_tracing();

        let log = EventLog::new();
        let names: Vec<String> = (0..500).map(|i| format!("step_{i}")).collect();
        let tasks = names.iter().map(|n| log.task(n, Duration::ZERO));
        let precedence: Precedence = names
            .windows(2)
            .map(|pair| (pair[1].clone(), vec![pair[0].clone()]))
            .collect();

        let system = TaskSystem::new(tasks, precedence)?;
        let state = Arc::new(SharedState::default());

        let report = system.run_parallel(&state).await?;
        assert_eq!(report.batches.len(), names.len());
        log.assert_happens_before(&system);

        log.clear();
        let report = system.run_sequential(&state)?;
        assert_eq!(report.batches.len(), 1);
        Ok(())
    })
    .await
}

#[tokio::test]
async fn schedulers_can_be_driven_directly() -> TestResult {
    crate::common::with_timeout(async {
        init_tracing();

        let log = EventLog::new();
        let system = diamond(&log, Duration::from_millis(20));
        let state = Arc::new(SharedState::default());

        let report = ParallelScheduler::new(&system)
            .with_workers(1)
            .run(&state)
            .await?;
        assert_eq!(report.batches, system.rounds());
        assert!(!log.overlapped("B", "C"), "one worker runs one action at a time");

        log.clear();
        let report = SequentialScheduler::new(&system).run(&state)?;
        assert_eq!(report.task_count(), system.len());
        log.assert_happens_before(&system);
        Ok(())
    })
    .await
}
