// tests/property_scheduling.rs

mod common;
use crate::common::recorder::{EventLog, Phase};

use std::collections::BTreeSet;
use std::sync::Arc;

use proptest::prelude::*;

use bernstein::errors::TaskSystemError;
use bernstein::system::{Precedence, SharedState, Task, TaskSystem};

const RESOURCES: [&str; 3] = ["R0", "R1", "R2"];

/// Randomly generated task set. Task `i` may only depend on tasks `0..i`,
/// so the precedence is always acyclic.
#[derive(Debug, Clone)]
struct SystemShape {
    deps: Vec<BTreeSet<usize>>,
    reads: Vec<Vec<&'static str>>,
    writes: Vec<Vec<&'static str>>,
    /// Register tasks in reverse index order, so prerequisites come after
    /// their dependents and the sequential scheduler needs several scans.
    reverse: bool,
}

fn resources_in(mask: u8) -> Vec<&'static str> {
    RESOURCES
        .iter()
        .enumerate()
        .filter(|(bit, _)| mask & (1 << bit) != 0)
        .map(|(_, name)| *name)
        .collect()
}

fn shape_strategy(max_tasks: usize) -> impl Strategy<Value = SystemShape> {
    (1..=max_tasks)
        .prop_flat_map(|n| {
            (
                proptest::collection::vec(proptest::collection::vec(any::<usize>(), 0..4), n),
                proptest::collection::vec(0u8..8, n),
                // Writers are rarer than readers, otherwise almost every
                // generated system is rejected.
                proptest::collection::vec(proptest::option::weighted(0.4, 0u8..8), n),
                any::<bool>(),
            )
        })
        .prop_map(|(raw_deps, read_masks, write_masks, reverse)| {
            let deps = raw_deps
                .into_iter()
                .enumerate()
                .map(|(i, raw)| {
                    if i == 0 {
                        BTreeSet::new()
                    } else {
                        raw.into_iter().map(|d| d % i).collect()
                    }
                })
                .collect();
            SystemShape {
                deps,
                reads: read_masks.into_iter().map(resources_in).collect(),
                writes: write_masks
                    .into_iter()
                    .map(|mask| resources_in(mask.unwrap_or(0)))
                    .collect(),
                reverse,
            }
        })
}

fn task_name(i: usize) -> String {
    format!("t{i}")
}

fn task_index(name: &str) -> usize {
    name[1..].parse().expect("generated task names are t<index>")
}

/// Every writer folds the values it reads into what it writes, so any
/// reordering of conflicting tasks changes the final state.
fn build(shape: &SystemShape, log: &EventLog) -> (Vec<Task>, Precedence) {
    let mut tasks = Vec::new();
    let mut precedence = Precedence::new();

    for i in 0..shape.deps.len() {
        let reads = shape.reads[i].clone();
        let writes = shape.writes[i].clone();
        let log = log.clone();
        let bias = i as i64 + 1;

        let task = Task::new(task_name(i))
            .reads(reads.clone())
            .writes(writes.clone())
            .action(move |scope| {
                log.record(scope.task_name(), Phase::Start);
                let mut acc = bias;
                for r in &reads {
                    acc = acc.wrapping_add(scope.read(r)?);
                }
                for w in &writes {
                    let current = scope.read(w)?;
                    scope.write(w, current.wrapping_mul(3).wrapping_add(acc))?;
                }
                log.record(scope.task_name(), Phase::End);
                Ok(())
            });
        tasks.push(task);
        precedence.insert(task_name(i), shape.deps[i].iter().map(|&d| task_name(d)));
    }

    if shape.reverse {
        tasks.reverse();
    }
    (tasks, precedence)
}

fn conflict(shape: &SystemShape, a: usize, b: usize) -> Vec<String> {
    let set = |v: &Vec<&'static str>| v.iter().copied().collect::<BTreeSet<_>>();
    let (r1, w1) = (set(&shape.reads[a]), set(&shape.writes[a]));
    let (r2, w2) = (set(&shape.reads[b]), set(&shape.writes[b]));

    let mut out: BTreeSet<&str> = BTreeSet::new();
    out.extend(w1.intersection(&r2));
    out.extend(r1.intersection(&w2));
    out.extend(w1.intersection(&w2));
    out.into_iter().map(str::to_string).collect()
}

fn directly_ordered(shape: &SystemShape, a: usize, b: usize) -> bool {
    shape.deps[a].contains(&b) || shape.deps[b].contains(&a)
}

fn expected_rounds(shape: &SystemShape) -> Vec<usize> {
    let mut round = vec![0; shape.deps.len()];
    for i in 0..shape.deps.len() {
        round[i] = shape.deps[i].iter().map(|&d| round[d] + 1).max().unwrap_or(0);
    }
    round
}

fn fresh_state() -> Arc<SharedState> {
    Arc::new(SharedState::new([("R0", 2), ("R1", 5), ("R2", 7)]))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn accepted_systems_schedule_correctly_and_rejections_are_real(
        shape in shape_strategy(8)
    ) {
        let log = EventLog::new();
        let (tasks, precedence) = build(&shape, &log);
        let n = shape.deps.len();

        let system = match TaskSystem::new(tasks, precedence) {
            Ok(system) => system.with_workers(3),
            Err(TaskSystemError::BernsteinViolation { first, second, resources }) => {
                let (a, b) = (task_index(&first), task_index(&second));
                prop_assert!(!resources.is_empty());
                prop_assert_eq!(&resources, &conflict(&shape, a, b));
                prop_assert!(!directly_ordered(&shape, a, b));
                return Ok(());
            }
            Err(other) => {
                return Err(TestCaseError::fail(format!("unexpected construction error: {other}")));
            }
        };

        // Every conflicting pair in an accepted system has a direct edge.
        for a in 0..n {
            for b in (a + 1)..n {
                if !conflict(&shape, a, b).is_empty() {
                    prop_assert!(directly_ordered(&shape, a, b), "t{a} / t{b} accepted unordered");
                }
            }
        }

        // round(T) = 1 + max(round of prerequisites), 0 without prerequisites.
        let expected = expected_rounds(&shape);
        let rounds = system.rounds();
        prop_assert_eq!(rounds.iter().map(Vec::len).sum::<usize>(), n);
        for (r, batch) in rounds.iter().enumerate() {
            for name in batch {
                prop_assert_eq!(expected[task_index(name)], r);
            }
        }

        let sequential_state = fresh_state();
        system.run_sequential(&sequential_state).map_err(|e| TestCaseError::fail(e.to_string()))?;
        log.assert_happens_before(&system);
        for i in 0..n {
            prop_assert_eq!(log.starts_of(&task_name(i)), 1);
        }

        log.clear();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .expect("tokio runtime");
        let parallel_state = fresh_state();
        let report = runtime
            .block_on(system.run_parallel(&parallel_state))
            .map_err(|e| TestCaseError::fail(e.to_string()))?;

        let report_rounds: Vec<Vec<&str>> = report
            .batches
            .iter()
            .map(|batch| batch.iter().map(String::as_str).collect())
            .collect();
        prop_assert_eq!(report_rounds, rounds);
        log.assert_happens_before(&system);

        // Conflicting tasks never race, so both schedulers agree.
        prop_assert_eq!(parallel_state.snapshot(), sequential_state.snapshot());
    }
}
