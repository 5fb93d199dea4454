//! Fail-fast behavior across real child processes.

use crate::common::{logging_package, read_log};
use stagehand::testing::MemorySink;
use stagehand::{Executor, ExecutorError, GraphError, Package, ScriptError};

#[tokio::test]
async fn first_failure_stops_scheduling_at_concurrency_one() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("run.log");

    let packages = vec![
        Package::builder("a")
            .path(dir.path())
            .script("build", "exit 5")
            .build(),
        logging_package(dir.path(), &log, "b", &[]),
        logging_package(dir.path(), &log, "c", &[]),
    ];

    let executor = Executor::with_sink(1, MemorySink::new());
    let err = executor.execute(&packages, "build").await.unwrap_err();

    match err {
        ExecutorError::Script(ScriptError::ExitCode { package, code }) => {
            assert_eq!(package.as_str(), "a");
            assert_eq!(code, 5);
        }
        other => panic!("expected a's failure, got {:?}", other),
    }

    // a failed before b or c was admitted; neither left a trace.
    assert!(read_log(&log).is_empty());
}

#[tokio::test]
async fn stage_failure_prevents_later_stages() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("run.log");

    let packages = vec![
        logging_package(dir.path(), &log, "base", &[]),
        Package::builder("mid")
            .path(dir.path())
            .script("build", "exit 2")
            .dependency("base")
            .build(),
        logging_package(dir.path(), &log, "top", &["mid"]),
    ];

    let executor = Executor::with_sink(2, MemorySink::new());
    let err = executor.execute_stages(&packages, "build").await.unwrap_err();

    match err {
        ExecutorError::StageFailed { stage, source } => {
            assert_eq!(stage, 2);
            assert!(source.to_string().contains("mid"));
        }
        other => panic!("expected StageFailed, got {:?}", other),
    }

    // Stage 1 completed; stage 3 never started.
    assert_eq!(read_log(&log), vec!["base"]);
}

#[tokio::test]
async fn stage_failure_message_names_stage_package_and_code() {
    let dir = tempfile::tempdir().unwrap();

    let packages = vec![
        Package::builder("root")
            .path(dir.path())
            .script("build", "true")
            .build(),
        Package::builder("leaf")
            .path(dir.path())
            .script("build", "exit 17")
            .dependency("root")
            .build(),
    ];

    let executor = Executor::with_sink(2, MemorySink::new());
    let err = executor.execute_stages(&packages, "build").await.unwrap_err();

    let message = err.to_string();
    assert!(message.contains("stage 2"), "message: {message}");
    assert!(message.contains("leaf"), "message: {message}");
    assert!(message.contains("17"), "message: {message}");
}

#[tokio::test]
async fn circular_workspace_rejects_before_spawning() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("run.log");

    let packages = vec![
        logging_package(dir.path(), &log, "x", &["y"]),
        logging_package(dir.path(), &log, "y", &["x"]),
    ];

    let executor = Executor::with_sink(2, MemorySink::new());
    let err = executor.execute_stages(&packages, "build").await.unwrap_err();

    assert!(matches!(
        err,
        ExecutorError::Graph(GraphError::CircularDependency(_))
    ));
    assert!(read_log(&log).is_empty());
}

#[tokio::test]
async fn spawn_failure_is_fatal_like_a_script_failure() {
    // Point the package at a directory that does not exist so the spawn
    // itself fails, not the script.
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("no-such-dir");

    let packages = vec![Package::builder("ghost")
        .path(&missing)
        .script("build", "true")
        .build()];

    let executor = Executor::with_sink(1, MemorySink::new());
    let err = executor.execute(&packages, "build").await.unwrap_err();

    match err {
        ExecutorError::Script(ScriptError::Spawn { package, script, .. }) => {
            assert_eq!(package.as_str(), "ghost");
            assert_eq!(script, "build");
        }
        other => panic!("expected Spawn failure, got {:?}", other),
    }
}

#[tokio::test]
async fn in_flight_work_is_orphaned_not_killed() {
    // Two packages launch together; one fails fast while the other is still
    // sleeping. The run rejects immediately, and the survivor's child keeps
    // running to completion in the background.
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("survivor-finished");

    let packages = vec![
        Package::builder("survivor")
            .path(dir.path())
            .script("build", format!("sleep 0.3; touch {}", marker.display()))
            .build(),
        Package::builder("doomed")
            .path(dir.path())
            .script("build", "exit 1")
            .build(),
    ];

    let executor = Executor::with_sink(2, MemorySink::new());
    let started = std::time::Instant::now();
    let result = executor.execute(&packages, "build").await;

    assert!(result.is_err());
    assert!(
        started.elapsed() < std::time::Duration::from_millis(250),
        "rejection must not wait for the surviving child"
    );
    assert!(!marker.exists());

    // The orphaned child finishes on its own.
    tokio::time::sleep(std::time::Duration::from_millis(500)).await;
    assert!(marker.exists());
}
