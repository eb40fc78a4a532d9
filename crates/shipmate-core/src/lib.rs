//! Shipmate Core - release selection for JavaScript monorepos
//!
//! This crate provides the error types, configuration, package graph and
//! the update collector that decides which workspace packages to release.
//! Git access goes through the [`VersionControl`] trait.

pub mod config;
pub mod error;
pub mod monorepo;
pub mod types;
pub mod vcs;

pub use error::{Result, ShipmateError};
pub use monorepo::{collect_updates, PackageUpdate, UpdateCollector, UpdateOptions};
pub use types::ReleaseType;
pub use vcs::VersionControl;
