//! Version control queries used by release selection
//!
//! The update collector never talks to git directly. It asks these four
//! questions through the [`VersionControl`] trait, which `shipmate-git`
//! implements on top of libgit2 and tests implement in memory.

use crate::error::Result;

/// Read-only repository queries needed to pick a release baseline and
/// list changed files
pub trait VersionControl {
    /// Whether the repository has any tags at all
    fn tags_exist(&self) -> Result<bool>;

    /// Abbreviated hash of the current HEAD commit
    fn current_short_hash(&self) -> Result<String>;

    /// Most recent annotated tag reachable from HEAD, if any
    fn most_recent_annotated_tag(&self) -> Result<Option<String>>;

    /// Repository-relative paths that differ from `baseline`.
    ///
    /// A single revision is compared with the working tree; a `from..to`
    /// range compares the two commits.
    fn changed_paths(&self, baseline: &str) -> Result<Vec<String>>;
}

impl<V: VersionControl + ?Sized> VersionControl for &V {
    fn tags_exist(&self) -> Result<bool> {
        (**self).tags_exist()
    }

    fn current_short_hash(&self) -> Result<String> {
        (**self).current_short_hash()
    }

    fn most_recent_annotated_tag(&self) -> Result<Option<String>> {
        (**self).most_recent_annotated_tag()
    }

    fn changed_paths(&self, baseline: &str) -> Result<Vec<String>> {
        (**self).changed_paths(baseline)
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use std::cell::{Cell, RefCell};

    use super::VersionControl;
    use crate::error::{GitError, Result};

    /// In-memory repository state for engine tests
    #[derive(Debug, Default)]
    pub struct FakeVcs {
        pub tags: bool,
        pub short_hash: String,
        pub annotated_tag: Option<String>,
        pub changed: Vec<String>,
        pub fail_diff: bool,
        pub diff_calls: Cell<usize>,
        pub baselines: RefCell<Vec<String>>,
    }

    impl FakeVcs {
        pub fn tagged(tag: &str) -> Self {
            Self {
                tags: true,
                short_hash: "abc1234".to_string(),
                annotated_tag: Some(tag.to_string()),
                ..Self::default()
            }
        }

        pub fn untagged() -> Self {
            Self {
                short_hash: "abc1234".to_string(),
                ..Self::default()
            }
        }

        pub fn with_changes(mut self, paths: &[&str]) -> Self {
            self.changed = paths.iter().map(|p| p.to_string()).collect();
            self
        }
    }

    impl VersionControl for FakeVcs {
        fn tags_exist(&self) -> Result<bool> {
            Ok(self.tags)
        }

        fn current_short_hash(&self) -> Result<String> {
            Ok(self.short_hash.clone())
        }

        fn most_recent_annotated_tag(&self) -> Result<Option<String>> {
            Ok(self.annotated_tag.clone())
        }

        fn changed_paths(&self, baseline: &str) -> Result<Vec<String>> {
            self.diff_calls.set(self.diff_calls.get() + 1);
            self.baselines.borrow_mut().push(baseline.to_string());
            if self.fail_diff {
                return Err(GitError::InvalidRevision(baseline.to_string()).into());
            }
            Ok(self.changed.clone())
        }
    }
}
