//! Collecting the packages that need a release
//!
//! This is where baseline resolution, forced publishes, prerelease
//! graduation, file-level change detection and dependent propagation come
//! together into one ordered update set.

use std::collections::HashSet;
use std::path::PathBuf;

use globset::GlobSet;
use tracing::{debug, info};

use crate::error::Result;
use crate::types::ReleaseType;
use crate::vcs::VersionControl;

use super::baseline::resolve_baseline;
use super::changes::{ChangeDetector, ChangeFilter, ChangeReason, DiffPredicate};
use super::dependents::{collect_dependents, CandidateSet};
use super::forced::{name_set, ForcedPackages, ForcedSpec};
use super::graph::{PackageGraph, PackageNode};

/// Options for one update collection
#[derive(Debug, Clone, Default)]
pub struct UpdateOptions {
    /// Only look at the HEAD commit (or what a merge commit brought in)
    pub canary: bool,
    /// Explicit reference to compare against
    pub since: Option<String>,
    /// Requested bump; only its prerelease-ness matters here
    pub cd_version: Option<ReleaseType>,
    /// Changed files matching these globs never trigger a release
    pub ignore_changes: Vec<String>,
    /// Packages released regardless of changes
    pub force_publish: ForcedSpec,
}

impl UpdateOptions {
    /// Whether prerelease packages must graduate in this release
    fn graduates_prereleases(&self) -> bool {
        !self.cd_version.is_some_and(|t| t.is_prerelease())
    }
}

/// A package in the update set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageUpdate<'g> {
    /// The package to release
    pub node: &'g PackageNode,
    /// Why it is released
    pub reason: ChangeReason,
}

/// Collects the update set for a workspace
pub struct UpdateCollector<'g, V: VersionControl + ?Sized> {
    graph: &'g PackageGraph,
    vcs: &'g V,
    root: PathBuf,
    scope: Vec<String>,
}

impl<'g, V: VersionControl + ?Sized> UpdateCollector<'g, V> {
    /// Create a collector. Package locations are interpreted relative to
    /// `root`, the repository working directory.
    pub fn new(graph: &'g PackageGraph, vcs: &'g V, root: impl Into<PathBuf>) -> Self {
        Self {
            graph,
            vcs,
            root: root.into(),
            scope: Vec::new(),
        }
    }

    /// Restrict the considered packages to names matching these globs.
    /// Dependents outside the scope still carry propagation but are not
    /// reported.
    pub fn with_scope<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scope.extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Determine which packages need a release, in graph order (candidate
    /// order for canary runs)
    pub fn collect(&self, options: &UpdateOptions) -> Result<Vec<PackageUpdate<'g>>> {
        // Every pattern is compiled before git is touched
        let forced = ForcedPackages::compile(&options.force_publish)?;
        let filter = ChangeFilter::new(&options.ignore_changes)?;
        let scope = self.compile_scope()?;

        let considered: Vec<&'g PackageNode> = self
            .graph
            .iter()
            .filter(|node| scope.as_ref().map_or(true, |s| s.is_match(&node.name)))
            .collect();

        info!(packages = considered.len(), "checking for updated packages");

        let baseline = resolve_baseline(self.vcs, options.since.as_deref(), options.canary)?;
        info!(
            baseline = baseline.as_deref().unwrap_or("initial commit"),
            "comparing with baseline"
        );

        let mut candidates = CandidateSet::new();

        match baseline {
            None => {
                for &node in &considered {
                    candidates.insert(node, ChangeReason::NoBaseline);
                }
            }
            Some(_) if forced.is_all() => {
                for &node in &considered {
                    candidates.insert(node, ChangeReason::Forced);
                }
            }
            Some(baseline) => {
                let detector = ChangeDetector::new(self.root.clone(), filter);
                let graduate = options.graduates_prereleases();
                let mut diff: Option<DiffPredicate> = None;

                for &node in &considered {
                    let reason = if forced.matches(&node.name) {
                        Some(ChangeReason::Forced)
                    } else if graduate && node.is_prerelease() {
                        Some(ChangeReason::Graduation)
                    } else {
                        if diff.is_none() {
                            diff = Some(detector.diff_predicate(self.vcs, &baseline)?);
                        }
                        diff.as_ref()
                            .is_some_and(|d| d.has_diff(node))
                            .then_some(ChangeReason::DirectChanges)
                    };

                    if let Some(reason) = reason {
                        debug!(package = %node.name, reason = %reason, "candidate");
                        candidates.insert(node, reason);
                    }
                }
            }
        }

        for dependent in collect_dependents(self.graph, &candidates) {
            debug!(
                package = %dependent.node.name,
                via = dependent.via,
                "dependent of a released package"
            );
            candidates.insert(
                dependent.node,
                ChangeReason::DependencyChanged(dependent.via.to_string()),
            );
        }

        let in_scope: HashSet<&str> = considered.iter().map(|n| n.name.as_str()).collect();
        let ordered: Vec<&'g PackageNode> = if options.canary {
            debug!("canary run, keeping candidate order");
            candidates
                .iter()
                .filter(|n| in_scope.contains(n.name.as_str()))
                .collect()
        } else {
            considered
                .iter()
                .copied()
                .filter(|n| candidates.contains(&n.name))
                .collect()
        };

        let updates: Vec<PackageUpdate<'g>> = ordered
            .into_iter()
            .filter_map(|node| {
                candidates.reason(&node.name).map(|reason| PackageUpdate {
                    node,
                    reason: reason.clone(),
                })
            })
            .collect();

        info!(
            updated = updates.len(),
            considered = considered.len(),
            "update collection complete"
        );
        Ok(updates)
    }

    fn compile_scope(&self) -> Result<Option<GlobSet>> {
        if self.scope.is_empty() {
            return Ok(None);
        }
        name_set("scope", &self.scope).map(Some)
    }
}

/// Convenience wrapper around [`UpdateCollector`] for the whole graph
pub fn collect_updates<'g, V: VersionControl + ?Sized>(
    graph: &'g PackageGraph,
    vcs: &'g V,
    root: impl Into<PathBuf>,
    options: &UpdateOptions,
) -> Result<Vec<PackageUpdate<'g>>> {
    UpdateCollector::new(graph, vcs, root).collect(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monorepo::discovery::DiscoveredPackage;
    use crate::vcs::fake::FakeVcs;

    const ROOT: &str = "/repo";

    fn package(name: &str, version: &str) -> DiscoveredPackage {
        DiscoveredPackage::new(name, version, format!("{}/packages/{}", ROOT, name))
    }

    /// A (no deps), B -> A, C unrelated
    fn abc() -> PackageGraph {
        PackageGraph::build(&[
            package("a", "1.0.0"),
            package("b", "1.0.0").depends_on("a"),
            package("c", "1.0.0"),
        ])
        .unwrap()
    }

    fn names(updates: &[PackageUpdate<'_>]) -> Vec<String> {
        updates.iter().map(|u| u.node.name.clone()).collect()
    }

    #[test]
    fn test_change_propagates_to_dependents() {
        let graph = abc();
        let vcs = FakeVcs::tagged("v1.0.0").with_changes(&["packages/a/src/index.js"]);

        let updates = collect_updates(&graph, &vcs, ROOT, &UpdateOptions::default()).unwrap();

        assert_eq!(names(&updates), vec!["a", "b"]);
        assert_eq!(updates[0].reason, ChangeReason::DirectChanges);
        assert_eq!(
            updates[1].reason,
            ChangeReason::DependencyChanged("a".to_string())
        );
        assert_eq!(vcs.baselines.borrow().as_slice(), ["v1.0.0"]);
    }

    #[test]
    fn test_output_follows_graph_order() {
        // B is discovered before A, and only B's dependency changed
        let graph = PackageGraph::build(&[
            package("b", "1.0.0").depends_on("a"),
            package("c", "1.0.0"),
            package("a", "1.0.0"),
        ])
        .unwrap();
        let vcs = FakeVcs::tagged("v1.0.0").with_changes(&["packages/a/index.js"]);

        let updates = collect_updates(&graph, &vcs, ROOT, &UpdateOptions::default()).unwrap();
        assert_eq!(names(&updates), vec!["b", "a"]);
    }

    #[test]
    fn test_forced_package_without_changes() {
        let graph = abc();
        let vcs = FakeVcs::tagged("v1.0.0");
        let options = UpdateOptions {
            force_publish: ForcedSpec::from_patterns(["c"]),
            ..UpdateOptions::default()
        };

        let updates = collect_updates(&graph, &vcs, ROOT, &options).unwrap();
        assert_eq!(names(&updates), vec!["c"]);
        assert_eq!(updates[0].reason, ChangeReason::Forced);
    }

    #[test]
    fn test_forced_package_still_propagates() {
        let graph = abc();
        let vcs = FakeVcs::tagged("v1.0.0");
        let options = UpdateOptions {
            force_publish: ForcedSpec::from_patterns(["a"]),
            ..UpdateOptions::default()
        };

        let updates = collect_updates(&graph, &vcs, ROOT, &options).unwrap();
        assert_eq!(names(&updates), vec!["a", "b"]);
    }

    #[test]
    fn test_forced_all_skips_diff() {
        let graph = abc();
        let vcs = FakeVcs::tagged("v1.0.0");
        let options = UpdateOptions {
            force_publish: ForcedSpec::All,
            ..UpdateOptions::default()
        };

        let updates = collect_updates(&graph, &vcs, ROOT, &options).unwrap();
        assert_eq!(names(&updates), vec!["a", "b", "c"]);
        assert!(updates.iter().all(|u| u.reason == ChangeReason::Forced));
        assert_eq!(vcs.diff_calls.get(), 0);
    }

    #[test]
    fn test_prerelease_graduates_on_normal_release() {
        let graph = PackageGraph::build(&[
            package("a", "2.0.0-alpha.1"),
            package("b", "1.0.0"),
        ])
        .unwrap();
        let vcs = FakeVcs::tagged("v1.0.0");

        let updates = collect_updates(&graph, &vcs, ROOT, &UpdateOptions::default()).unwrap();
        assert_eq!(names(&updates), vec!["a"]);
        assert_eq!(updates[0].reason, ChangeReason::Graduation);

        let options = UpdateOptions {
            cd_version: Some(ReleaseType::Minor),
            ..UpdateOptions::default()
        };
        let updates = collect_updates(&graph, &vcs, ROOT, &options).unwrap();
        assert_eq!(names(&updates), vec!["a"]);
    }

    #[test]
    fn test_prerelease_channel_does_not_graduate() {
        let graph = PackageGraph::build(&[
            package("a", "2.0.0-alpha.1"),
            package("b", "1.0.0"),
        ])
        .unwrap();
        let vcs = FakeVcs::tagged("v1.0.0");
        let options = UpdateOptions {
            cd_version: Some(ReleaseType::Prerelease),
            ..UpdateOptions::default()
        };

        let updates = collect_updates(&graph, &vcs, ROOT, &options).unwrap();
        assert!(updates.is_empty());
    }

    #[test]
    fn test_no_tags_releases_everything() {
        let graph = abc();
        let vcs = FakeVcs::untagged();

        let updates = collect_updates(&graph, &vcs, ROOT, &UpdateOptions::default()).unwrap();
        assert_eq!(names(&updates), vec!["a", "b", "c"]);
        assert!(updates.iter().all(|u| u.reason == ChangeReason::NoBaseline));
        assert_eq!(vcs.diff_calls.get(), 0);
    }

    #[test]
    fn test_canary_without_tags_is_full_and_stable() {
        let graph = abc();
        let vcs = FakeVcs::untagged();
        let options = UpdateOptions {
            canary: true,
            ..UpdateOptions::default()
        };

        let first = collect_updates(&graph, &vcs, ROOT, &options).unwrap();
        let second = collect_updates(&graph, &vcs, ROOT, &options).unwrap();
        assert_eq!(names(&first), vec!["a", "b", "c"]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_canary_diffs_head_commit() {
        let graph = abc();
        let vcs = FakeVcs::tagged("v1.0.0").with_changes(&["packages/c/index.js"]);
        let options = UpdateOptions {
            canary: true,
            since: Some("v0.9.0".to_string()),
            ..UpdateOptions::default()
        };

        let updates = collect_updates(&graph, &vcs, ROOT, &options).unwrap();
        assert_eq!(names(&updates), vec!["c"]);
        assert_eq!(vcs.baselines.borrow().as_slice(), ["abc1234^..abc1234"]);
    }

    #[test]
    fn test_canary_keeps_candidate_order() {
        // Dependents are appended after direct candidates
        let graph = PackageGraph::build(&[
            package("b", "1.0.0").depends_on("a"),
            package("a", "1.0.0"),
            package("c", "1.0.0"),
        ])
        .unwrap();
        let vcs = FakeVcs::tagged("v1.0.0")
            .with_changes(&["packages/a/index.js", "packages/c/index.js"]);
        let options = UpdateOptions {
            canary: true,
            ..UpdateOptions::default()
        };

        let updates = collect_updates(&graph, &vcs, ROOT, &options).unwrap();
        assert_eq!(names(&updates), vec!["a", "c", "b"]);
    }

    #[test]
    fn test_ignored_changes_do_not_release() {
        let graph = abc();
        let vcs = FakeVcs::tagged("v1.0.0")
            .with_changes(&["packages/a/README.md", "packages/c/src/x.js"]);
        let options = UpdateOptions {
            ignore_changes: vec!["*.md".to_string()],
            ..UpdateOptions::default()
        };

        let updates = collect_updates(&graph, &vcs, ROOT, &options).unwrap();
        assert_eq!(names(&updates), vec!["c"]);
    }

    #[test]
    fn test_diff_listed_once_for_all_packages() {
        let graph = abc();
        let vcs = FakeVcs::tagged("v1.0.0").with_changes(&["packages/b/x.js"]);

        collect_updates(&graph, &vcs, ROOT, &UpdateOptions::default()).unwrap();
        assert_eq!(vcs.diff_calls.get(), 1);
    }

    #[test]
    fn test_explicit_since_is_the_baseline() {
        let graph = abc();
        let vcs = FakeVcs::tagged("v1.0.0");
        let options = UpdateOptions {
            since: Some("main".to_string()),
            ..UpdateOptions::default()
        };

        collect_updates(&graph, &vcs, ROOT, &options).unwrap();
        assert_eq!(vcs.baselines.borrow().as_slice(), ["main"]);
    }

    #[test]
    fn test_idempotent() {
        let graph = abc();
        let vcs = FakeVcs::tagged("v1.0.0").with_changes(&["packages/a/x.js"]);

        let first = collect_updates(&graph, &vcs, ROOT, &UpdateOptions::default()).unwrap();
        let second = collect_updates(&graph, &vcs, ROOT, &UpdateOptions::default()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_vcs_failure_is_fatal() {
        let graph = abc();
        let mut vcs = FakeVcs::tagged("v1.0.0");
        vcs.fail_diff = true;

        assert!(collect_updates(&graph, &vcs, ROOT, &UpdateOptions::default()).is_err());
    }

    #[test]
    fn test_bad_glob_fails_before_git() {
        let graph = abc();
        let vcs = FakeVcs::tagged("v1.0.0");
        let options = UpdateOptions {
            ignore_changes: vec!["{unclosed".to_string()],
            ..UpdateOptions::default()
        };

        assert!(collect_updates(&graph, &vcs, ROOT, &options).is_err());
        assert_eq!(vcs.diff_calls.get(), 0);
    }

    #[test]
    fn test_scope_limits_reported_packages() {
        let graph = abc();
        let vcs = FakeVcs::tagged("v1.0.0").with_changes(&["packages/a/x.js"]);

        let updates = UpdateCollector::new(&graph, &vcs, ROOT)
            .with_scope(["a", "c"])
            .collect(&UpdateOptions::default())
            .unwrap();
        assert_eq!(names(&updates), vec!["a"]);

        let updates = UpdateCollector::new(&graph, &vcs, ROOT)
            .with_scope(["b"])
            .collect(&UpdateOptions::default())
            .unwrap();
        assert!(updates.is_empty());
    }

    #[test]
    fn test_scope_with_no_baseline() {
        let graph = abc();
        let vcs = FakeVcs::untagged();

        let updates = UpdateCollector::new(&graph, &vcs, ROOT)
            .with_scope(["b", "c"])
            .collect(&UpdateOptions::default())
            .unwrap();
        assert_eq!(names(&updates), vec!["b", "c"]);
    }
}
