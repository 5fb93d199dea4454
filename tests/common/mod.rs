//! Common test utilities shared across integration tests.

use stagehand::Package;
use std::path::Path;

/// Build a package rooted in `dir` whose script appends the package name to
/// `log` before exiting.
///
/// The log file gives tests a durable record of which packages actually ran
/// and in what order, independent of output capture.
pub fn logging_package(dir: &Path, log: &Path, name: &str, deps: &[&str]) -> Package {
    Package::builder(name)
        .path(dir)
        .script("build", format!("echo {} >> {}", name, log.display()))
        .dependencies(deps.iter().copied())
        .build()
}

/// Read the run log written by [`logging_package`] scripts.
///
/// Returns an empty list when no script ever ran.
pub fn read_log(log: &Path) -> Vec<String> {
    std::fs::read_to_string(log)
        .map(|contents| contents.lines().map(str::to_string).collect())
        .unwrap_or_default()
}
