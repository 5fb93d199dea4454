//! Workspace dependency graph, topological ordering, and stage partitioning.
//!
//! The graph is keyed by package name and only keeps edges to packages that
//! are actually part of the workspace; dependencies on external packages are
//! assumed already satisfied and carry no ordering constraint.

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use super::package::Package;
use super::types::PackageName;

/// Errors that can occur when ordering the workspace graph.
#[derive(Debug, Error)]
pub enum GraphError {
    /// The workspace dependency metadata is not a DAG.
    #[error("circular dependency detected among packages: {0}")]
    CircularDependency(String),
}

/// Mapping from package name to its in-workspace dependencies.
///
/// Built once per run and immutable thereafter. Edge lists preserve the
/// order in which dependencies were declared.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    edges: HashMap<PackageName, Vec<PackageName>>,
}

impl DependencyGraph {
    /// Build the graph from a package list.
    ///
    /// Each package's declared dependencies are filtered to names present in
    /// the input list; everything else is dropped. An empty dependency list
    /// is valid and means "no ordering constraint".
    pub fn build(packages: &[Package]) -> Self {
        let known: HashSet<&PackageName> = packages.iter().map(Package::name).collect();

        let mut edges = HashMap::with_capacity(packages.len());
        for pkg in packages {
            let deps: Vec<PackageName> = pkg
                .dependencies()
                .iter()
                .filter(|dep| known.contains(dep))
                .cloned()
                .collect();
            edges.insert(pkg.name().clone(), deps);
        }

        Self { edges }
    }

    /// Get the in-workspace dependencies of a package.
    pub fn dependencies_of(&self, name: &PackageName) -> &[PackageName] {
        self.edges.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Get the number of packages in the graph.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Check if the graph is empty.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Order packages so that every package appears after all of its
    /// in-workspace dependencies.
    ///
    /// Dependency-first traversal in input order, with an explicit stack
    /// rather than recursion so very large workspaces cannot exhaust the
    /// call stack. Cycles are not detected here; a cyclic graph yields some
    /// total order in first-visit order, and [`Self::partition_into_stages`]
    /// surfaces the fault before anything runs.
    pub fn topological_sort(&self, packages: &[Package]) -> Vec<Package> {
        let index: HashMap<&PackageName, &Package> =
            packages.iter().map(|p| (p.name(), p)).collect();

        let mut visited: HashSet<PackageName> = HashSet::with_capacity(packages.len());
        let mut order: Vec<Package> = Vec::with_capacity(packages.len());

        for pkg in packages {
            if visited.contains(pkg.name()) {
                continue;
            }
            visited.insert(pkg.name().clone());

            // Stack frames are (package, next dependency index to visit).
            let mut stack: Vec<(&PackageName, usize)> = vec![(pkg.name(), 0)];

            while let Some(frame) = stack.last_mut() {
                let current = frame.0;
                let dep_index = frame.1;
                let deps = self.dependencies_of(current);
                if let Some(dep) = deps.get(dep_index) {
                    frame.1 += 1;
                    if !visited.contains(dep) {
                        visited.insert(dep.clone());
                        stack.push((dep, 0));
                    }
                } else {
                    // All dependencies emitted; emit the package itself.
                    if let Some(found) = index.get(current) {
                        order.push((*found).clone());
                    }
                    stack.pop();
                }
            }
        }

        order
    }

    /// Group topologically sorted packages into ordered stages.
    ///
    /// Each stage is the maximal set of not-yet-placed packages whose
    /// in-workspace dependencies have all been placed in earlier stages.
    /// Scanning the sorted list and finding nothing to place while packages
    /// remain means the graph contains a cycle, which is fatal: no partial
    /// partitioning is attempted and no package is silently dropped.
    pub fn partition_into_stages(
        &self,
        sorted: &[Package],
    ) -> Result<Vec<Vec<Package>>, GraphError> {
        let mut stages: Vec<Vec<Package>> = Vec::new();
        let mut completed: HashSet<PackageName> = HashSet::with_capacity(sorted.len());

        while completed.len() < sorted.len() {
            let mut stage: Vec<Package> = Vec::new();

            for pkg in sorted {
                if completed.contains(pkg.name()) {
                    continue;
                }
                let deps_completed = self
                    .dependencies_of(pkg.name())
                    .iter()
                    .all(|dep| completed.contains(dep));
                if deps_completed {
                    stage.push(pkg.clone());
                }
            }

            if stage.is_empty() {
                let stuck: Vec<&str> = sorted
                    .iter()
                    .filter(|p| !completed.contains(p.name()))
                    .map(|p| p.name().as_str())
                    .collect();
                return Err(GraphError::CircularDependency(stuck.join(", ")));
            }

            for pkg in &stage {
                completed.insert(pkg.name().clone());
            }
            stages.push(stage);
        }

        Ok(stages)
    }
}
