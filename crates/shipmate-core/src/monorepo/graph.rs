//! Dependency graph for workspace packages

use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{GraphError, Result};

use super::discovery::DiscoveredPackage;

/// A node in the dependency graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageNode {
    /// Package name
    pub name: String,
    /// Package directory
    pub location: PathBuf,
    /// Package version
    pub version: String,
    /// Workspace packages this package depends on
    pub dependencies: Vec<String>,
    /// Workspace packages that depend on this package
    pub dependents: Vec<String>,
}

impl PackageNode {
    /// Whether the current version sits on a prerelease line
    /// (e.g. `2.0.0-alpha.1`). Unparseable versions count as stable.
    pub fn is_prerelease(&self) -> bool {
        match semver::Version::parse(&self.version) {
            Ok(version) => !version.pre.is_empty(),
            Err(e) => {
                debug!(package = %self.name, version = %self.version, error = %e, "unparseable version");
                false
            }
        }
    }
}

/// Dependency graph for workspace packages.
///
/// Iteration order is the order packages were supplied in, which is the
/// order every update set is reported in.
#[derive(Debug, Clone, Default)]
pub struct PackageGraph {
    nodes: Vec<PackageNode>,
    index: HashMap<String, usize>,
}

impl PackageGraph {
    /// Build a dependency graph from discovered packages
    pub fn build(packages: &[DiscoveredPackage]) -> Result<Self> {
        let mut nodes: Vec<PackageNode> = Vec::with_capacity(packages.len());
        let mut index: HashMap<String, usize> = HashMap::new();

        for pkg in packages {
            if let Some(&existing) = index.get(&pkg.name) {
                let first: &PackageNode = &nodes[existing];
                return Err(GraphError::DuplicatePackage {
                    name: pkg.name.clone(),
                    first: first.location.clone(),
                    second: pkg.path.clone(),
                }
                .into());
            }
            index.insert(pkg.name.clone(), nodes.len());
            nodes.push(PackageNode {
                name: pkg.name.clone(),
                location: pkg.path.clone(),
                version: pkg.version.clone(),
                dependencies: Vec::new(),
                dependents: Vec::new(),
            });
        }

        // Forward edges, external names dropped
        for pkg in packages {
            let mut deps: Vec<String> = Vec::new();
            for dep in &pkg.workspace_dependencies {
                if !index.contains_key(dep) {
                    debug!(package = %pkg.name, dependency = %dep, "ignoring external dependency");
                    continue;
                }
                if !deps.contains(dep) {
                    deps.push(dep.clone());
                }
            }
            nodes[index[&pkg.name]].dependencies = deps;
        }

        // Reverse edges, precomputed once
        for i in 0..nodes.len() {
            let name = nodes[i].name.clone();
            for dep in nodes[i].dependencies.clone() {
                nodes[index[&dep]].dependents.push(name.clone());
            }
        }

        Ok(Self { nodes, index })
    }

    /// Number of packages
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no packages
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get a package node
    pub fn get(&self, name: &str) -> Option<&PackageNode> {
        self.index.get(name).map(|&i| &self.nodes[i])
    }

    /// Whether a package is part of the graph
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Iterate packages in graph order
    pub fn iter(&self) -> impl Iterator<Item = &PackageNode> {
        self.nodes.iter()
    }

    /// Direct dependents of a package
    pub fn dependents_of<'g>(&'g self, name: &str) -> impl Iterator<Item = &'g PackageNode> + 'g {
        self.get(name)
            .map(|n| n.dependents.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(move |d| self.get(d))
    }

    /// Packages that sit on a dependency cycle, in graph order
    /// (Kahn's algorithm: whatever never reaches in-degree zero)
    pub fn cyclic_packages(&self) -> Vec<&str> {
        let mut in_degree: Vec<usize> = self.nodes.iter().map(|n| n.dependencies.len()).collect();
        let mut queue: VecDeque<usize> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, d)| **d == 0)
            .map(|(i, _)| i)
            .collect();
        let mut done: HashSet<usize> = HashSet::new();

        while let Some(i) = queue.pop_front() {
            done.insert(i);
            for dependent in &self.nodes[i].dependents {
                let j = self.index[dependent];
                in_degree[j] = in_degree[j].saturating_sub(1);
                if in_degree[j] == 0 {
                    queue.push_back(j);
                }
            }
        }

        self.nodes
            .iter()
            .enumerate()
            .filter(|(i, _)| !done.contains(i))
            .map(|(_, n)| n.name.as_str())
            .collect()
    }
}

/// Package location relative to the repository root
pub(crate) fn relative_location<'a>(root: &Path, location: &'a Path) -> &'a Path {
    location.strip_prefix(root).unwrap_or(location)
}
