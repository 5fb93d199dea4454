//! Manifest loading through the public API, end to end.

use crate::common::read_log;
use stagehand::testing::MemorySink;
use stagehand::{Executor, WorkspaceConfig};

#[tokio::test]
async fn manifest_to_staged_run() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("core")).unwrap();
    std::fs::create_dir(dir.path().join("app")).unwrap();
    let log = dir.path().join("run.log");

    let manifest = format!(
        r#"
concurrency: 2
packages:
  - name: core
    path: core
    scripts:
      build: echo core >> {log}
  - name: app
    path: app
    scripts:
      build: echo app >> {log}
    dependencies: [core]
"#,
        log = log.display()
    );
    let manifest_path = dir.path().join("workspace.yaml");
    std::fs::write(&manifest_path, manifest).unwrap();

    let config = WorkspaceConfig::from_file(&manifest_path).unwrap();
    let concurrency = config.concurrency.unwrap();
    let packages = config.into_packages(dir.path());

    let executor = Executor::with_sink(concurrency, MemorySink::new());
    executor.execute_stages(&packages, "build").await.unwrap();

    assert_eq!(read_log(&log), vec!["core", "app"]);
}

#[tokio::test]
async fn manifest_packages_run_in_their_own_directories() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("one")).unwrap();
    std::fs::create_dir(dir.path().join("two")).unwrap();

    let manifest = r#"
packages:
  - name: one
    path: one
    scripts:
      stamp: touch here
  - name: two
    path: two
    scripts:
      stamp: touch here
"#;
    let manifest_path = dir.path().join("workspace.yaml");
    std::fs::write(&manifest_path, manifest).unwrap();

    let packages = WorkspaceConfig::from_file(&manifest_path)
        .unwrap()
        .into_packages(dir.path());

    let executor = Executor::with_sink(2, MemorySink::new());
    executor.execute(&packages, "stamp").await.unwrap();

    assert!(dir.path().join("one/here").exists());
    assert!(dir.path().join("two/here").exists());
}

#[tokio::test]
async fn external_dependencies_do_not_constrain_ordering() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("lib")).unwrap();
    let log = dir.path().join("run.log");

    // `lib` depends on registry packages that are not workspace members;
    // they must not block staging.
    let manifest = format!(
        r#"
packages:
  - name: lib
    path: lib
    scripts:
      build: echo lib >> {log}
    dependencies: [react, left-pad]
"#,
        log = log.display()
    );
    let manifest_path = dir.path().join("workspace.yaml");
    std::fs::write(&manifest_path, manifest).unwrap();

    let packages = WorkspaceConfig::from_file(&manifest_path)
        .unwrap()
        .into_packages(dir.path());

    let executor = Executor::with_sink(2, MemorySink::new());
    executor.execute_stages(&packages, "build").await.unwrap();

    assert_eq!(read_log(&log), vec!["lib"]);
}
