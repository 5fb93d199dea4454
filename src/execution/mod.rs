//! Script execution: the per-package runner, the output sink seam, and the
//! bounded fail-fast executor.

pub mod executor;
pub mod script;
pub mod sink;

pub use executor::{Executor, ExecutorError, DEFAULT_CONCURRENCY};
pub use script::{ScriptError, ScriptOutcome, ScriptRunner};
pub use sink::{OutputSink, OutputStream, StdioSink};
