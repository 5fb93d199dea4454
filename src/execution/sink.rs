//! Output sinks for script output.
//!
//! The script runner never writes to stdout/stderr directly; it hands every
//! line to an [`OutputSink`] together with the package it came from. The
//! default [`StdioSink`] renders the `[<package>] ` prefix on the parent's
//! corresponding stream, which keeps interleaved output from concurrent
//! packages attributable. Tests swap in a capturing sink (see
//! [`crate::testing::MemorySink`]) for deterministic assertions.

use async_trait::async_trait;

use crate::core::types::PackageName;

/// Which stream of the child process a line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    /// The child's standard output.
    Stdout,
    /// The child's standard error.
    Stderr,
}

/// Destination for package-attributed script output.
#[async_trait]
pub trait OutputSink: Send + Sync {
    /// Write one line of script output, attributed to a package.
    async fn write_line(&self, package: &PackageName, stream: OutputStream, line: &str);
}

/// Sink that forwards prefixed lines to the parent's stdout/stderr.
#[derive(Debug, Default)]
pub struct StdioSink;

impl StdioSink {
    /// Create a new stdio sink.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl OutputSink for StdioSink {
    async fn write_line(&self, package: &PackageName, stream: OutputStream, line: &str) {
        match stream {
            OutputStream::Stdout => println!("[{}] {}", package, line),
            OutputStream::Stderr => eprintln!("[{}] {}", package, line),
        }
    }
}
