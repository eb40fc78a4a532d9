//! Transitive dependent closure

use std::collections::{HashMap, HashSet, VecDeque};

use super::changes::ChangeReason;
use super::graph::{PackageGraph, PackageNode};

/// Packages selected for release, keyed by name.
///
/// Remembers insertion order for canary output; the normal output order
/// comes from the graph instead.
#[derive(Debug, Clone, Default)]
pub struct CandidateSet<'g> {
    order: Vec<&'g PackageNode>,
    reasons: HashMap<&'g str, ChangeReason>,
}

impl<'g> CandidateSet<'g> {
    /// Create an empty candidate set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a package. Returns `false` if it was already present, in which
    /// case the first reason is kept.
    pub fn insert(&mut self, node: &'g PackageNode, reason: ChangeReason) -> bool {
        if self.reasons.contains_key(node.name.as_str()) {
            return false;
        }
        self.reasons.insert(node.name.as_str(), reason);
        self.order.push(node);
        true
    }

    /// Whether a package is present
    pub fn contains(&self, name: &str) -> bool {
        self.reasons.contains_key(name)
    }

    /// Why a package was selected
    pub fn reason(&self, name: &str) -> Option<&ChangeReason> {
        self.reasons.get(name)
    }

    /// Number of packages
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Packages in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &'g PackageNode> + '_ {
        self.order.iter().copied()
    }
}

/// A package pulled in because something it depends on is released
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AffectedDependent<'g> {
    /// The dependent package
    pub node: &'g PackageNode,
    /// The package whose dependents edge reached it
    pub via: &'g str,
}

/// Collect every package that transitively depends on a candidate and is
/// not a candidate itself.
///
/// Breadth-first over the reverse edges from each candidate. Candidates are
/// never walked through from another start since each is a start of its own,
/// and the per-start `seen` set stops dependency cycles from looping.
pub fn collect_dependents<'g>(
    graph: &'g PackageGraph,
    candidates: &CandidateSet<'g>,
) -> Vec<AffectedDependent<'g>> {
    let mut collected: Vec<AffectedDependent<'g>> = Vec::new();
    let mut collected_names: HashSet<&'g str> = HashSet::new();

    for start in candidates.iter() {
        if start.dependents.is_empty() {
            continue;
        }

        let mut queue: VecDeque<&'g PackageNode> = VecDeque::from([start]);
        let mut seen: HashSet<&'g str> = HashSet::new();

        while let Some(node) = queue.pop_front() {
            for dependent in graph.dependents_of(&node.name) {
                let name = dependent.name.as_str();
                if !seen.insert(name) {
                    continue;
                }
                if name == start.name || candidates.contains(name) {
                    continue;
                }
                if collected_names.insert(name) {
                    collected.push(AffectedDependent {
                        node: dependent,
                        via: node.name.as_str(),
                    });
                }
                queue.push_back(dependent);
            }
        }
    }

    collected
}
