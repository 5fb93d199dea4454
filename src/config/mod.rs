//! Workspace manifest loading and parsing.

mod yaml;

pub use yaml::{ConfigError, PackageConfig, WorkspaceConfig};
