//! Testing utilities for users of the stagehand library.
//!
//! [`MemorySink`] captures script output in memory instead of writing it to
//! the real stdout/stderr, so tests can assert on exactly what a run
//! produced without capturing process streams.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::core::types::PackageName;
use crate::execution::sink::{OutputSink, OutputStream};

/// One captured line of script output.
#[derive(Debug, Clone)]
pub struct RecordedLine {
    /// The package the line came from.
    pub package: PackageName,
    /// Which child stream produced it.
    pub stream: OutputStream,
    /// The line itself, without the package prefix.
    pub line: String,
}

/// An [`OutputSink`] that records lines for later assertions.
///
/// # Example
///
/// ```
/// use stagehand::testing::MemorySink;
/// use stagehand::{Executor, Package};
///
/// # async fn run() {
/// let sink = MemorySink::new();
/// let executor = Executor::with_sink(2, sink.clone());
///
/// let pkg = Package::builder("demo")
///     .path(std::env::temp_dir())
///     .script("build", "echo hello")
///     .build();
/// executor.execute(&[pkg], "build").await.unwrap();
///
/// assert_eq!(sink.lines_for("demo").await, vec!["hello"]);
/// # }
/// ```
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<RecordedLine>>,
}

impl MemorySink {
    /// Create a new, empty capture sink.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            lines: Mutex::new(Vec::new()),
        })
    }

    /// All captured lines, in arrival order.
    pub async fn lines(&self) -> Vec<RecordedLine> {
        self.lines.lock().await.clone()
    }

    /// Captured line bodies for one package, in arrival order.
    pub async fn lines_for(&self, package: &str) -> Vec<String> {
        self.lines
            .lock()
            .await
            .iter()
            .filter(|l| l.package.as_str() == package)
            .map(|l| l.line.clone())
            .collect()
    }

    /// Number of captured lines across all packages.
    pub async fn len(&self) -> usize {
        self.lines.lock().await.len()
    }

    /// Check whether nothing was captured.
    pub async fn is_empty(&self) -> bool {
        self.lines.lock().await.is_empty()
    }
}

#[async_trait]
impl OutputSink for MemorySink {
    async fn write_line(&self, package: &PackageName, stream: OutputStream, line: &str) {
        self.lines.lock().await.push(RecordedLine {
            package: package.clone(),
            stream,
            line: line.to_string(),
        });
    }
}
