//! Script execution for a single package.
//!
//! [`ScriptRunner`] is the unit of work of the whole runner: look up a named
//! script on one package, spawn it as a child process in the package
//! directory, stream its output through the configured sink, and report how
//! it ended.

use std::process::Stdio;
use std::sync::Arc;

use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::debug;

use crate::core::package::Package;
use crate::core::types::PackageName;

use super::sink::{OutputSink, OutputStream, StdioSink};

/// Errors that can occur when running a package script.
#[derive(Debug, Error)]
pub enum ScriptError {
    /// The script ran and exited with a nonzero code.
    #[error("{package} exited with code {code}")]
    ExitCode {
        /// The package whose script failed.
        package: PackageName,
        /// The nonzero exit code.
        code: i32,
    },

    /// The child process could not be started or awaited.
    #[error("failed to run '{script}' in {package}: {source}")]
    Spawn {
        /// The package whose script could not start.
        package: PackageName,
        /// The requested script name.
        script: String,
        /// The underlying OS error.
        source: std::io::Error,
    },
}

/// How a package script resolved, short of failing.
///
/// Failures are reported through [`ScriptError`], so a runner call yields
/// one of three states: succeeded, skipped, or an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptOutcome {
    /// The script ran and the process exited cleanly.
    Succeeded {
        /// The exit code; an absent code (signal-terminated child) is
        /// reported as 0.
        exit_code: i32,
    },

    /// The package does not declare the requested script. Not an error.
    Skipped,
}

/// Runs one package script as a child process, streaming its output.
pub struct ScriptRunner {
    sink: Arc<dyn OutputSink>,
}

impl ScriptRunner {
    /// Create a runner that writes prefixed output to stdout/stderr.
    pub fn new() -> Self {
        Self::with_sink(Arc::new(StdioSink::new()))
    }

    /// Create a runner with a custom output sink.
    pub fn with_sink(sink: Arc<dyn OutputSink>) -> Self {
        Self { sink }
    }

    /// Run `script_name` in the given package.
    ///
    /// Resolves to [`ScriptOutcome::Skipped`] without spawning anything when
    /// the package does not declare the script. Otherwise the script's
    /// command line runs through `sh -c` with the package directory as its
    /// working directory, and both output streams are forwarded line by line
    /// to the sink until the process exits.
    ///
    /// An exit code of 0 succeeds. An absent exit code (the child was
    /// terminated by a signal) also counts as success. Anything else, and
    /// any spawn-level fault, is a [`ScriptError`].
    pub async fn run(
        &self,
        package: &Package,
        script_name: &str,
    ) -> Result<ScriptOutcome, ScriptError> {
        let Some(command) = package.script(script_name) else {
            debug!(package = %package.name(), script = script_name, "script not declared, skipping");
            return Ok(ScriptOutcome::Skipped);
        };

        debug!(package = %package.name(), script = script_name, "spawning script");

        let mut child = Command::new("sh")
            .arg("-c")
            .arg(command)
            .current_dir(package.path())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ScriptError::Spawn {
                package: package.name().clone(),
                script: script_name.to_string(),
                source,
            })?;

        let mut forwarders = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            forwarders.push(tokio::spawn(forward_lines(
                stdout,
                package.name().clone(),
                OutputStream::Stdout,
                Arc::clone(&self.sink),
            )));
        }
        if let Some(stderr) = child.stderr.take() {
            forwarders.push(tokio::spawn(forward_lines(
                stderr,
                package.name().clone(),
                OutputStream::Stderr,
                Arc::clone(&self.sink),
            )));
        }

        let status = child.wait().await.map_err(|source| ScriptError::Spawn {
            package: package.name().clone(),
            script: script_name.to_string(),
            source,
        })?;

        // Drain remaining buffered output before reporting the outcome.
        for forwarder in forwarders {
            let _ = forwarder.await;
        }

        match status.code() {
            Some(0) | None => Ok(ScriptOutcome::Succeeded {
                exit_code: status.code().unwrap_or(0),
            }),
            Some(code) => Err(ScriptError::ExitCode {
                package: package.name().clone(),
                code,
            }),
        }
    }
}

impl Default for ScriptRunner {
    fn default() -> Self {
        Self::new()
    }
}

/// Forward lines from a child stream to the sink, attributed to a package.
async fn forward_lines(
    reader: impl AsyncRead + Unpin,
    package: PackageName,
    stream: OutputStream,
    sink: Arc<dyn OutputSink>,
) {
    let mut lines = BufReader::new(reader).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        sink.write_line(&package, stream, &line).await;
    }
}
