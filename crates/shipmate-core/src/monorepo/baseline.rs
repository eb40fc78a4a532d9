//! Choosing the commit to compare against

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::vcs::VersionControl;

/// Range covering exactly one commit: for a merge commit, everything the
/// merge brought in
pub fn canary_range(short_hash: &str) -> String {
    format!("{short_hash}^..{short_hash}")
}

/// Resolve the baseline for change detection.
///
/// Returns `None` when there is nothing to compare against: the repository
/// has no tags, or no annotated tag is reachable from HEAD. A canary run
/// compares the HEAD commit with its first parent, an explicit `since` is
/// used verbatim, and otherwise the most recent annotated tag is used.
pub fn resolve_baseline<V: VersionControl + ?Sized>(
    vcs: &V,
    since: Option<&str>,
    canary: bool,
) -> Result<Option<String>> {
    if !vcs.tags_exist()? {
        warn!("no git tags were found in the repository");
        return Ok(None);
    }

    if canary {
        let sha = vcs.current_short_hash()?;
        debug!(sha = %sha, "canary baseline from HEAD");
        return Ok(Some(canary_range(&sha)));
    }

    if let Some(since) = since.filter(|s| !s.is_empty()) {
        return Ok(Some(since.to_string()));
    }

    match vcs.most_recent_annotated_tag()? {
        Some(tag) => {
            info!(tag = %tag, "using most recent annotated tag");
            Ok(Some(tag))
        }
        None => {
            warn!("no annotated tag reachable from HEAD");
            Ok(None)
        }
    }
}
