//! Tag operations

use git2::{DescribeFormatOptions, DescribeOptions};
use tracing::{debug, instrument};

use crate::repository::{GitRepo, Result};

impl GitRepo {
    /// Whether the repository has at least one tag of any kind
    pub fn has_tags(&self) -> Result<bool> {
        let names = self.repo.tag_names(None)?;
        debug!(count = names.len(), "listed tags");
        Ok(!names.is_empty())
    }

    /// Name of the most recent annotated tag reachable from HEAD.
    ///
    /// Lightweight tags are skipped. Returns `None` when no annotated tag
    /// describes HEAD.
    #[instrument(skip(self))]
    pub fn describe_annotated(&self) -> Result<Option<String>> {
        let describe = match self.repo.describe(&DescribeOptions::new()) {
            Ok(describe) => describe,
            Err(e) if e.code() == git2::ErrorCode::NotFound => {
                debug!(reason = %e.message(), "no annotated tag describes HEAD");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let mut format = DescribeFormatOptions::new();
        format.abbreviated_size(0);
        let tag = describe.format(Some(&format))?;

        debug!(tag = %tag, "described HEAD");
        Ok(Some(tag))
    }
}
