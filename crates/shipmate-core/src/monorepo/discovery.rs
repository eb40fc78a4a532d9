//! Package discovery in npm-style workspaces

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use glob::glob;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{ConfigError, GraphError, Result};

/// Manifest file expected in every package directory
pub const MANIFEST_NAME: &str = "package.json";

/// A discovered package in the workspace
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveredPackage {
    /// Package name
    pub name: String,
    /// Package version
    pub version: String,
    /// Path to the package directory
    pub path: PathBuf,
    /// Dependencies on other packages in the workspace
    pub workspace_dependencies: Vec<String>,
}

impl DiscoveredPackage {
    /// Create a package description by hand
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            path: path.into(),
            workspace_dependencies: Vec::new(),
        }
    }

    /// Add a dependency on another workspace package
    pub fn depends_on(mut self, name: impl Into<String>) -> Self {
        self.workspace_dependencies.push(name.into());
        self
    }
}

#[derive(Deserialize)]
struct PackageJson {
    name: Option<String>,
    version: Option<String>,
    #[serde(default)]
    dependencies: BTreeMap<String, serde_json::Value>,
    #[serde(default, rename = "devDependencies")]
    dev_dependencies: BTreeMap<String, serde_json::Value>,
    #[serde(default, rename = "peerDependencies")]
    peer_dependencies: BTreeMap<String, serde_json::Value>,
    #[serde(default, rename = "optionalDependencies")]
    optional_dependencies: BTreeMap<String, serde_json::Value>,
}

/// Package discovery for workspaces
pub struct PackageDiscovery {
    root: PathBuf,
    patterns: Vec<String>,
}

impl PackageDiscovery {
    /// Create a new package discovery instance
    pub fn new(root: impl Into<PathBuf>, patterns: Vec<String>) -> Self {
        Self {
            root: root.into(),
            patterns,
        }
    }

    /// Discover all packages in the workspace, in pattern order
    pub fn discover(&self) -> Result<Vec<DiscoveredPackage>> {
        debug!(
            root = %self.root.display(),
            patterns = self.patterns.len(),
            "discovering packages"
        );
        let mut found: Vec<(DiscoveredPackage, Vec<String>)> = Vec::new();
        let mut seen_dirs: HashSet<PathBuf> = HashSet::new();

        // First pass: read every manifest
        for pattern in &self.patterns {
            let full_pattern = if pattern == "." {
                self.root.to_string_lossy().to_string()
            } else {
                self.root.join(pattern).to_string_lossy().to_string()
            };

            let entries = glob(&full_pattern).map_err(|e| ConfigError::InvalidValue {
                field: "packages".to_string(),
                message: format!("{}: {}", pattern, e),
            })?;

            for entry in entries {
                let path = entry.map_err(|e| ConfigError::InvalidValue {
                    field: "packages".to_string(),
                    message: e.to_string(),
                })?;

                let dir = if path.is_dir() {
                    path
                } else if path.file_name().is_some_and(|f| f == MANIFEST_NAME) {
                    path.parent().unwrap_or(Path::new(".")).to_path_buf()
                } else {
                    continue;
                };

                let manifest_path = dir.join(MANIFEST_NAME);
                if !manifest_path.exists() || !seen_dirs.insert(dir.clone()) {
                    continue;
                }

                if let Some(parsed) = self.parse_package(&dir, &manifest_path)? {
                    found.push(parsed);
                }
            }
        }

        // Second pass: keep only dependencies that live in the workspace
        let all_names: HashSet<String> = found.iter().map(|(p, _)| p.name.clone()).collect();
        let packages: Vec<DiscoveredPackage> = found
            .into_iter()
            .map(|(mut pkg, declared)| {
                pkg.workspace_dependencies = declared
                    .into_iter()
                    .filter(|name| all_names.contains(name))
                    .collect();
                pkg
            })
            .collect();

        info!(count = packages.len(), "discovered packages");
        Ok(packages)
    }

    /// Parse an npm package, returning it with every declared dependency name
    fn parse_package(
        &self,
        dir: &Path,
        manifest_path: &Path,
    ) -> Result<Option<(DiscoveredPackage, Vec<String>)>> {
        let content =
            std::fs::read_to_string(manifest_path).map_err(|e| GraphError::ManifestUnreadable {
                path: manifest_path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let manifest: PackageJson =
            serde_json::from_str(&content).map_err(|e| GraphError::ManifestUnreadable {
                path: manifest_path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let Some(name) = manifest.name else {
            warn!(manifest = %manifest_path.display(), "skipping manifest without a name");
            return Ok(None);
        };

        let mut declared: Vec<String> = Vec::new();
        for section in [
            manifest.dependencies,
            manifest.dev_dependencies,
            manifest.peer_dependencies,
            manifest.optional_dependencies,
        ] {
            for dep in section.into_keys() {
                if dep != name && !declared.contains(&dep) {
                    declared.push(dep);
                }
            }
        }

        let package = DiscoveredPackage {
            name,
            version: manifest.version.unwrap_or_else(|| "0.0.0".to_string()),
            path: dir.to_path_buf(),
            workspace_dependencies: Vec::new(),
        };
        Ok(Some((package, declared)))
    }
}
