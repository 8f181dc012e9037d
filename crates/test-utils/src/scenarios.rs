#![allow(dead_code)]

use bernstein::config::ConfigFile;
use bernstein::system::{Precedence, SharedState, Task, TaskSystem};

use crate::builders::{ConfigFileBuilder, TaskConfigBuilder};

/// The four-task system used throughout the tests:
///
/// - T1 writes X (X = 1)
/// - T2 reads X, writes Y (Y = X + X), after T1
/// - T3 writes Z (Z = 1)
/// - T4 reads Z and Y, writes Z (Z = Z + Y), after T2 and T3
pub fn sample_tasks() -> Vec<Task> {
    vec![
        Task::new("T1").writes(["X"]).action(|scope| {
            scope.write("X", 1)?;
            Ok(())
        }),
        Task::new("T2").reads(["X"]).writes(["Y"]).action(|scope| {
            let x = scope.read("X")?;
            scope.write("Y", x + x)?;
            Ok(())
        }),
        Task::new("T3").writes(["Z"]).action(|scope| {
            scope.write("Z", 1)?;
            Ok(())
        }),
        Task::new("T4").reads(["Z", "Y"]).writes(["Z"]).action(|scope| {
            let z = scope.read("Z")?;
            let y = scope.read("Y")?;
            scope.write("Z", z + y)?;
            Ok(())
        }),
    ]
}

pub fn sample_precedence() -> Precedence {
    Precedence::new()
        .with("T1", Vec::<String>::new())
        .with("T2", ["T1"])
        .with("T3", Vec::<String>::new())
        .with("T4", ["T2", "T3"])
}

pub fn sample_system() -> TaskSystem {
    TaskSystem::new(sample_tasks(), sample_precedence()).expect("sample system is valid")
}

/// Shared state for the sample system, with every variable at zero.
pub fn sample_state() -> SharedState {
    SharedState::new([("X", 0), ("Y", 0), ("Z", 0)])
}

/// The same system expressed as a config.
pub fn sample_config() -> ConfigFile {
    ConfigFileBuilder::new()
        .with_resource("X", 0)
        .with_resource("Y", 0)
        .with_resource("Z", 0)
        .with_task(TaskConfigBuilder::new("T1").writes("X").set("X", 1).build())
        .with_task(
            TaskConfigBuilder::new("T2")
                .reads("X")
                .writes("Y")
                .after("T1")
                .sum("Y", &["X", "X"])
                .build(),
        )
        .with_task(TaskConfigBuilder::new("T3").writes("Z").set("Z", 1).build())
        .with_task(
            TaskConfigBuilder::new("T4")
                .reads("Z")
                .reads("Y")
                .writes("Z")
                .after("T2")
                .after("T3")
                .sum("Z", &["Z", "Y"])
                .build(),
        )
        .build()
}
