#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use bernstein::system::{Task, TaskSystem};

/// Which end of a task execution an event marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Start,
    End,
}

/// Totally ordered log of task start/end events.
///
/// Events are appended under a mutex, so their position in the log is a
/// real-time order that tests can use to check happens-before and overlap.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<(String, Phase)>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, task: &str, phase: Phase) {
        self.events.lock().unwrap().push((task.to_string(), phase));
    }

    /// A task that records its start, sleeps for `pause`, then records its
    /// end. It declares no resources.
    pub fn task(&self, name: &str, pause: Duration) -> Task {
        let log = self.clone();
        Task::new(name).action(move |scope| {
            log.record(scope.task_name(), Phase::Start);
            if !pause.is_zero() {
                std::thread::sleep(pause);
            }
            log.record(scope.task_name(), Phase::End);
            Ok(())
        })
    }

    pub fn events(&self) -> Vec<(String, Phase)> {
        self.events.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }

    /// Position of the first `phase` event for `task`.
    pub fn position(&self, task: &str, phase: Phase) -> Option<usize> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .position(|(t, p)| t == task && *p == phase)
    }

    /// Number of `Start` events recorded for `task`.
    pub fn starts_of(&self, task: &str) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(t, p)| t == task && *p == Phase::Start)
            .count()
    }

    /// Whether the executions of `a` and `b` overlapped in time.
    pub fn overlapped(&self, a: &str, b: &str) -> bool {
        let (Some(a_start), Some(a_end), Some(b_start), Some(b_end)) = (
            self.position(a, Phase::Start),
            self.position(a, Phase::End),
            self.position(b, Phase::Start),
            self.position(b, Phase::End),
        ) else {
            return false;
        };
        a_start < b_end && b_start < a_end
    }

    /// Panic unless every task's direct prerequisites ended before it started.
    pub fn assert_happens_before(&self, system: &TaskSystem) {
        for task in system.tasks() {
            let start = self
                .position(task.name(), Phase::Start)
                .unwrap_or_else(|| panic!("task {} never started", task.name()));
            for prerequisite in system.prerequisites_of(task.name()) {
                let end = self
                    .position(prerequisite, Phase::End)
                    .unwrap_or_else(|| panic!("prerequisite {prerequisite} never ended"));
                assert!(
                    end < start,
                    "{prerequisite} (ended at {end}) must finish before {} (started at {start})",
                    task.name()
                );
            }
        }
    }
}
