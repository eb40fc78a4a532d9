//! Monorepo support for multi-package repositories
//!
//! This module decides which packages of a workspace need a release:
//! - Package discovery with glob patterns
//! - Dependency graph with reverse edges
//! - Baseline selection from tags, `since` or the HEAD commit
//! - Change detection based on git diffs, with ignore globs
//! - Forced publishes and prerelease graduation
//! - Propagation to transitive dependents

pub mod baseline;
pub mod changes;
pub mod dependents;
pub mod discovery;
pub mod forced;
pub mod graph;
pub mod updates;

pub use baseline::{canary_range, resolve_baseline};
pub use changes::{ChangeDetector, ChangeFilter, ChangeReason, DiffPredicate};
pub use dependents::{collect_dependents, AffectedDependent, CandidateSet};
pub use discovery::{DiscoveredPackage, PackageDiscovery};
pub use forced::{ForcedPackages, ForcedSpec, ALL_PACKAGES};
pub use graph::{PackageGraph, PackageNode};
pub use updates::{collect_updates, PackageUpdate, UpdateCollector, UpdateOptions};
