//! Bounded, fail-fast execution across workspace packages.
//!
//! The [`Executor`] drives one [`ScriptRunner`] task per package, never
//! exceeding its concurrency limit, and aborts scheduling the moment any
//! package fails. [`Executor::execute`] ignores dependency order;
//! [`Executor::execute_stages`] runs the dependency-ordered stage plan.

use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use thiserror::Error;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, info};

use crate::core::graph::{DependencyGraph, GraphError};
use crate::core::package::Package;

use super::script::{ScriptError, ScriptOutcome, ScriptRunner};
use super::sink::OutputSink;

/// Default number of packages processed simultaneously.
pub const DEFAULT_CONCURRENCY: usize = 3;

/// Errors that can occur while executing scripts across the workspace.
#[derive(Debug, Error)]
pub enum ExecutorError {
    /// A package script failed (nonzero exit or spawn fault).
    #[error(transparent)]
    Script(#[from] ScriptError),

    /// The workspace dependency graph is not a DAG.
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// A stage of a staged run failed; wraps the stage's own error.
    #[error("stage {stage} failed: {source}")]
    StageFailed {
        /// 1-based index of the failed stage.
        stage: usize,
        /// The failure that stopped the stage.
        #[source]
        source: Box<ExecutorError>,
    },

    /// A script task panicked or was aborted by the runtime.
    #[error("script task failed: {0}")]
    TaskPanic(String),
}

/// Executes a named script across packages with bounded concurrency and
/// fail-fast semantics.
pub struct Executor {
    concurrency: usize,
    runner: Arc<ScriptRunner>,
}

impl Executor {
    /// Create an executor with the given concurrency limit.
    ///
    /// A limit of zero is treated as 1.
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
            runner: Arc::new(ScriptRunner::new()),
        }
    }

    /// Create an executor that streams script output to a custom sink.
    pub fn with_sink(concurrency: usize, sink: Arc<dyn OutputSink>) -> Self {
        Self {
            concurrency: concurrency.max(1),
            runner: Arc::new(ScriptRunner::with_sink(sink)),
        }
    }

    /// Get the concurrency limit.
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Run `script_name` across all packages, ignoring dependency order.
    ///
    /// Tasks launch in input order. Before a launch would exceed the
    /// concurrency limit, the executor waits for one in-flight task to
    /// settle; steady-state parallelism is therefore exactly the limit once
    /// the pipeline is full. The first failure stops further launches and is
    /// returned immediately. Tasks already in flight at that point are not
    /// killed; they finish in the background and their outcomes are
    /// discarded.
    ///
    /// On full success, returns one outcome per package in launch order.
    pub async fn execute(
        &self,
        packages: &[Package],
        script_name: &str,
    ) -> Result<Vec<ScriptOutcome>, ExecutorError> {
        let mut in_flight: FuturesUnordered<_> = FuturesUnordered::new();
        let mut outcomes: Vec<Option<ScriptOutcome>> = vec![None; packages.len()];

        for (index, pkg) in packages.iter().enumerate() {
            if in_flight.len() >= self.concurrency {
                // Admission control: wait for one task to settle before
                // launching the next. An Err return here drops `in_flight`,
                // orphaning the running children rather than killing them.
                if let Some(settled) = in_flight.next().await {
                    let (settled_index, outcome) = unpack(settled)?;
                    outcomes[settled_index] = Some(outcome);
                }
            }

            let runner = Arc::clone(&self.runner);
            let package = pkg.clone();
            let script = script_name.to_string();
            let handle: JoinHandle<Result<ScriptOutcome, ScriptError>> =
                tokio::spawn(async move { runner.run(&package, &script).await });
            in_flight.push(async move { (index, handle.await) });
        }

        while let Some(settled) = in_flight.next().await {
            let (settled_index, outcome) = unpack(settled)?;
            outcomes[settled_index] = Some(outcome);
        }

        Ok(outcomes.into_iter().flatten().collect())
    }

    /// Run `script_name` across all packages in dependency-ordered stages.
    ///
    /// Builds the dependency graph, sorts topologically, partitions into
    /// stages, and runs one bounded fail-fast pass per stage. A cyclic graph
    /// fails before any process is spawned. A stage failure stops the run;
    /// no later stage starts, and the error carries the stage index.
    pub async fn execute_stages(
        &self,
        packages: &[Package],
        script_name: &str,
    ) -> Result<(), ExecutorError> {
        let graph = DependencyGraph::build(packages);
        let sorted = graph.topological_sort(packages);
        let stages = graph.partition_into_stages(&sorted)?;

        info!(
            script = script_name,
            stages = stages.len(),
            packages = packages.len(),
            "executing in stages (fail-fast)"
        );

        for (index, stage) in stages.iter().enumerate() {
            let stage_number = index + 1;
            let members: Vec<&str> = stage.iter().map(|p| p.name().as_str()).collect();
            info!(stage = stage_number, members = %members.join(", "), "starting stage");

            match self.execute(stage, script_name).await {
                Ok(outcomes) => {
                    debug!(
                        stage = stage_number,
                        completed = outcomes.len(),
                        "stage completed"
                    );
                }
                Err(source) => {
                    return Err(ExecutorError::StageFailed {
                        stage: stage_number,
                        source: Box::new(source),
                    });
                }
            }
        }

        Ok(())
    }
}

impl Default for Executor {
    fn default() -> Self {
        Self::new(DEFAULT_CONCURRENCY)
    }
}

/// Map a settled task back to `(index, outcome)`, surfacing failures.
fn unpack(
    settled: (usize, Result<Result<ScriptOutcome, ScriptError>, JoinError>),
) -> Result<(usize, ScriptOutcome), ExecutorError> {
    let (index, joined) = settled;
    match joined {
        Ok(Ok(outcome)) => Ok((index, outcome)),
        Ok(Err(script_err)) => Err(ExecutorError::Script(script_err)),
        Err(join_err) => Err(ExecutorError::TaskPanic(join_err.to_string())),
    }
}
