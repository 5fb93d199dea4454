//! stagehand - run workspace package scripts in dependency-ordered stages.
//!
//! Given a list of package descriptors, stagehand builds the in-workspace
//! dependency graph, partitions it into stages, and executes a named script
//! across each stage with bounded concurrency and fail-fast semantics. A
//! flat mode runs the whole workspace at once, ignoring dependency order.

pub mod config;
pub mod core;
pub mod execution;
pub mod testing;

pub use config::{ConfigError, PackageConfig, WorkspaceConfig};
pub use core::graph::{DependencyGraph, GraphError};
pub use core::package::{Package, PackageBuilder};
pub use core::types::PackageName;
pub use execution::executor::{Executor, ExecutorError, DEFAULT_CONCURRENCY};
pub use execution::script::{ScriptError, ScriptOutcome, ScriptRunner};
pub use execution::sink::{OutputSink, OutputStream, StdioSink};
