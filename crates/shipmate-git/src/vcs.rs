//! [`VersionControl`] on top of libgit2

use shipmate_core::vcs::VersionControl;

use crate::repository::GitRepo;

impl VersionControl for GitRepo {
    fn tags_exist(&self) -> shipmate_core::Result<bool> {
        Ok(self.has_tags()?)
    }

    fn current_short_hash(&self) -> shipmate_core::Result<String> {
        Ok(self.short_head()?)
    }

    fn most_recent_annotated_tag(&self) -> shipmate_core::Result<Option<String>> {
        Ok(self.describe_annotated()?)
    }

    fn changed_paths(&self, baseline: &str) -> shipmate_core::Result<Vec<String>> {
        Ok(self.diff_paths(baseline)?)
    }
}
