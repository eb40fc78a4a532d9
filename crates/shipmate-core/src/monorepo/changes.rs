//! Change detection for monorepos

use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{PatternError, Result};
use crate::vcs::VersionControl;

use super::graph::{relative_location, PackageNode};

/// Reason why a package is in the update set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum ChangeReason {
    /// No baseline to compare against, so everything is released
    NoBaseline,
    /// Matched the forced-publish patterns
    Forced,
    /// Prerelease version graduating on a normal release
    Graduation,
    /// Direct file changes in the package
    DirectChanges,
    /// Depends on a package that is being released
    DependencyChanged(String),
}

impl std::fmt::Display for ChangeReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoBaseline => write!(f, "no baseline"),
            Self::Forced => write!(f, "forced"),
            Self::Graduation => write!(f, "prerelease graduation"),
            Self::DirectChanges => write!(f, "direct changes"),
            Self::DependencyChanged(dep) => write!(f, "dependency '{}' changed", dep),
        }
    }
}

/// Filter for files that should never trigger a release
#[derive(Debug, Clone)]
pub struct ChangeFilter {
    /// Globs matched against the whole repository-relative path
    paths: GlobSet,
    /// Globs without a `/`, matched against the file name
    basenames: GlobSet,
}

impl Default for ChangeFilter {
    fn default() -> Self {
        Self {
            paths: GlobSet::empty(),
            basenames: GlobSet::empty(),
        }
    }
}

impl ChangeFilter {
    /// Compile ignore globs. Malformed globs fail here, before any git work.
    pub fn new<S: AsRef<str>>(ignore: &[S]) -> Result<Self> {
        let mut paths = GlobSetBuilder::new();
        let mut basenames = GlobSetBuilder::new();

        for pattern in ignore {
            let pattern = pattern.as_ref();
            let glob = GlobBuilder::new(pattern)
                .literal_separator(true)
                .build()
                .map_err(|e| invalid(pattern, e.kind().to_string()))?;

            if pattern.contains('/') {
                paths.add(glob);
            } else {
                basenames.add(glob);
            }
        }

        Ok(Self {
            paths: paths.build().map_err(|e| invalid("", e.to_string()))?,
            basenames: basenames.build().map_err(|e| invalid("", e.to_string()))?,
        })
    }

    /// Whether a changed file is ignored
    pub fn is_ignored(&self, file: &Path) -> bool {
        if self.paths.is_match(file) {
            return true;
        }
        file.file_name()
            .is_some_and(|name| self.basenames.is_match(Path::new(name)))
    }
}

fn invalid(pattern: &str, reason: String) -> crate::error::ShipmateError {
    PatternError::InvalidGlob {
        option: "ignore_changes",
        pattern: pattern.to_string(),
        reason,
    }
    .into()
}

/// Change detector for monorepos
pub struct ChangeDetector {
    /// Root path of the repository
    root: PathBuf,
    filter: ChangeFilter,
}

impl ChangeDetector {
    /// Create a new change detector
    pub fn new(root: impl Into<PathBuf>, filter: ChangeFilter) -> Self {
        Self {
            root: root.into(),
            filter,
        }
    }

    /// List the changes since `baseline` once and return a predicate that
    /// answers per package from that listing
    pub fn diff_predicate<V: VersionControl + ?Sized>(
        &self,
        vcs: &V,
        baseline: &str,
    ) -> Result<DiffPredicate> {
        let listed = vcs.changed_paths(baseline)?;
        let total = listed.len();

        let changed: Vec<PathBuf> = listed
            .into_iter()
            .filter(|line| !line.is_empty())
            .map(PathBuf::from)
            .filter(|file| !self.filter.is_ignored(file))
            .collect();

        info!(
            baseline,
            changed = total,
            considered = changed.len(),
            "listed changed files"
        );

        Ok(DiffPredicate {
            root: self.root.clone(),
            changed,
        })
    }
}

/// Answers "did this package change?" from a precomputed diff listing
#[derive(Debug, Clone)]
pub struct DiffPredicate {
    root: PathBuf,
    changed: Vec<PathBuf>,
}

impl DiffPredicate {
    /// Build a predicate over an already filtered listing
    pub fn from_paths(root: impl Into<PathBuf>, changed: Vec<PathBuf>) -> Self {
        Self {
            root: root.into(),
            changed,
        }
    }

    /// Changed files that survived the ignore filter
    pub fn changed_files(&self) -> &[PathBuf] {
        &self.changed
    }

    /// Whether any surviving changed file lies under the package location.
    /// A package at the repository root owns every file.
    pub fn has_diff(&self, node: &PackageNode) -> bool {
        let location = relative_location(&self.root, &node.location);
        let hit = self.changed.iter().any(|file| file.starts_with(location));
        debug!(package = %node.name, location = %location.display(), changed = hit, "diff check");
        hit
    }
}
