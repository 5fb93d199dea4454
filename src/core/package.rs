//! Workspace package descriptors.
//!
//! A [`Package`] describes one workspace member: where it lives on disk,
//! which scripts its manifest declares, and which other packages it depends
//! on. Descriptors are produced by a workspace collaborator (typically the
//! manifest loader in [`crate::config`]) and consumed by the graph builder
//! and the executor; this module does no discovery of its own.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::types::PackageName;

/// A workspace member.
///
/// Dependency names may point outside the workspace; the graph builder drops
/// those when ordering, so a descriptor can carry its full declared
/// dependency list verbatim.
///
/// # Example
///
/// ```
/// use stagehand::Package;
///
/// let pkg = Package::builder("ts-utils")
///     .path("/repo/packages/ts-utils")
///     .script("build", "tsc -b")
///     .script("test", "vitest run")
///     .dependency("ts-core")
///     .build();
///
/// assert!(pkg.has_script("build"));
/// assert_eq!(pkg.dependencies().len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Package {
    /// Unique name, used as the graph node key.
    name: PackageName,
    /// Package directory; working directory for its scripts.
    path: PathBuf,
    /// Script name -> command line, from the package manifest.
    scripts: HashMap<String, String>,
    /// Declared dependency names, in declared order.
    dependencies: Vec<PackageName>,
}

impl Package {
    /// Create a new builder for a package descriptor.
    pub fn builder(name: impl Into<PackageName>) -> PackageBuilder {
        PackageBuilder::new(name)
    }

    /// Get the package name.
    pub fn name(&self) -> &PackageName {
        &self.name
    }

    /// Get the package directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Look up the command line for a script, if the package declares it.
    pub fn script(&self, script_name: &str) -> Option<&str> {
        self.scripts.get(script_name).map(String::as_str)
    }

    /// Check whether the package declares a script with the given name.
    pub fn has_script(&self, script_name: &str) -> bool {
        self.scripts.contains_key(script_name)
    }

    /// Get the declared dependency names, in declared order.
    pub fn dependencies(&self) -> &[PackageName] {
        &self.dependencies
    }
}

/// Builder for [`Package`] descriptors.
#[derive(Debug, Clone)]
pub struct PackageBuilder {
    name: PackageName,
    path: PathBuf,
    scripts: HashMap<String, String>,
    dependencies: Vec<PackageName>,
}

impl PackageBuilder {
    /// Create a new builder with the given package name.
    pub fn new(name: impl Into<PackageName>) -> Self {
        Self {
            name: name.into(),
            path: PathBuf::from("."),
            scripts: HashMap::new(),
            dependencies: Vec::new(),
        }
    }

    /// Set the package directory.
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }

    /// Declare a script.
    pub fn script(mut self, name: impl Into<String>, command: impl Into<String>) -> Self {
        self.scripts.insert(name.into(), command.into());
        self
    }

    /// Declare a single dependency.
    pub fn dependency(mut self, name: impl Into<PackageName>) -> Self {
        self.dependencies.push(name.into());
        self
    }

    /// Declare multiple dependencies.
    pub fn dependencies<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<PackageName>,
    {
        self.dependencies.extend(names.into_iter().map(Into::into));
        self
    }

    /// Build the [`Package`].
    pub fn build(self) -> Package {
        Package {
            name: self.name,
            path: self.path,
            scripts: self.scripts,
            dependencies: self.dependencies,
        }
    }
}
