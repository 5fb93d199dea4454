//! YAML workspace manifest parsing.
//!
//! The manifest is the materialized output of whatever discovers the
//! workspace: an explicit, ordered list of package descriptors plus a
//! default concurrency. There is no glob resolution or directory scanning
//! here; the file says exactly what the workspace contains.
//!
//! ```yaml
//! concurrency: 3
//! packages:
//!   - name: core
//!     path: packages/core
//!     scripts:
//!       build: tsc -b
//!       test: vitest run
//!   - name: app
//!     path: packages/app
//!     scripts:
//!       build: tsc -b
//!     dependencies: [core]
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use thiserror::Error;

use crate::core::package::Package;

/// Errors that can occur when loading a workspace manifest.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the manifest file.
    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse YAML.
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Two packages share the same name.
    #[error("duplicate package name: {0}")]
    DuplicatePackage(String),

    /// Invalid manifest value.
    #[error("invalid manifest: {0}")]
    Invalid(String),
}

/// Workspace manifest (workspace.yaml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Default number of packages to run simultaneously.
    pub concurrency: Option<usize>,
    /// Package descriptors, in workspace order.
    pub packages: Vec<PackageConfig>,
}

/// One package entry in the manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageConfig {
    /// Unique package name.
    pub name: String,
    /// Package directory, absolute or relative to the manifest.
    pub path: String,
    /// Script name -> command line.
    #[serde(default)]
    pub scripts: HashMap<String, String>,
    /// Declared dependency names.
    #[serde(default)]
    pub dependencies: Vec<String>,
}

impl WorkspaceConfig {
    /// Parse a manifest from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: WorkspaceConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and parse a manifest file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Convert the manifest into package descriptors.
    ///
    /// Relative package paths are resolved against `root` (typically the
    /// manifest's directory). The returned list preserves manifest order.
    pub fn into_packages(self, root: &Path) -> Vec<Package> {
        self.packages
            .into_iter()
            .map(|entry| {
                let path = root.join(&entry.path);
                let mut builder = Package::builder(entry.name).path(path);
                for (script, command) in entry.scripts {
                    builder = builder.script(script, command);
                }
                builder.dependencies(entry.dependencies).build()
            })
            .collect()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.packages.is_empty() {
            return Err(ConfigError::Invalid(
                "manifest declares no packages".to_string(),
            ));
        }
        if self.concurrency == Some(0) {
            return Err(ConfigError::Invalid(
                "concurrency must be a positive integer".to_string(),
            ));
        }

        let mut seen: HashSet<&str> = HashSet::with_capacity(self.packages.len());
        for entry in &self.packages {
            if entry.name.is_empty() {
                return Err(ConfigError::Invalid(
                    "package name must not be empty".to_string(),
                ));
            }
            if !seen.insert(&entry.name) {
                return Err(ConfigError::DuplicatePackage(entry.name.clone()));
            }
        }

        Ok(())
    }
}
