//! Shipmate Git - Git operations for release selection
//!
//! This crate answers the repository questions the update collector asks:
//! whether tags exist, the current HEAD hash, the most recent annotated tag
//! and which files changed since a baseline.

mod diff;
mod repository;
mod tags;
mod vcs;

#[cfg(test)]
pub(crate) mod testing;

pub use repository::{GitRepo, Result};
