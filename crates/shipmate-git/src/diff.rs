//! Changed files since a baseline

use git2::{Diff, RevparseMode};
use tracing::{debug, instrument};

use shipmate_core::error::GitError;

use crate::repository::{GitRepo, Result};

impl GitRepo {
    /// Abbreviated hash of HEAD
    pub fn short_head(&self) -> Result<String> {
        let head = self.head_commit()?;
        let short = head.as_object().short_id()?;
        Ok(String::from_utf8_lossy(&short).into_owned())
    }

    /// Repository-relative paths that differ from `spec`.
    ///
    /// A `from..to` range compares the two commits, and `from...to` compares
    /// their merge base with `to`. A single revision is compared with the
    /// working tree, staged and unstaged changes included.
    #[instrument(skip(self))]
    pub fn diff_paths(&self, spec: &str) -> Result<Vec<String>> {
        let revspec = self.repo.revparse(spec).map_err(|e| match e.code() {
            git2::ErrorCode::NotFound | git2::ErrorCode::InvalidSpec => {
                GitError::InvalidRevision(spec.to_string())
            }
            _ => GitError::Git2(e),
        })?;
        let invalid = || GitError::InvalidRevision(spec.to_string());

        let diff = if revspec.mode().contains(RevparseMode::RANGE) {
            let from = revspec.from().ok_or_else(invalid)?.peel_to_commit()?;
            let to = revspec.to().ok_or_else(invalid)?.peel_to_commit()?;
            let old = if revspec.mode().contains(RevparseMode::MERGE_BASE) {
                let base = self.repo.merge_base(from.id(), to.id())?;
                debug!(spec, base = %base, "comparing from merge base");
                self.repo.find_commit(base)?
            } else {
                from
            };
            self.repo
                .diff_tree_to_tree(Some(&old.tree()?), Some(&to.tree()?), None)?
        } else {
            let tree = revspec.from().ok_or_else(invalid)?.peel_to_tree()?;
            self.repo.diff_tree_to_workdir_with_index(Some(&tree), None)?
        };

        let paths = delta_paths(&diff);
        debug!(spec, count = paths.len(), "listed changed paths");
        Ok(paths)
    }
}

fn delta_paths(diff: &Diff<'_>) -> Vec<String> {
    diff.deltas()
        .filter_map(|delta| delta.new_file().path().or_else(|| delta.old_file().path()))
        .map(|path| path.to_string_lossy().into_owned())
        .collect()
}
