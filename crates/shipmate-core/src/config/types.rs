//! Configuration types

use serde::{Deserialize, Serialize};

use crate::monorepo::ForcedSpec;

/// Main configuration for Shipmate
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Project name
    pub name: Option<String>,

    /// Globs locating package directories, relative to the workspace root
    pub packages: Vec<String>,

    /// Update detection configuration
    pub updates: UpdatesConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: None,
            packages: vec!["packages/*".to_string()],
            updates: UpdatesConfig::default(),
        }
    }
}

/// Update detection configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdatesConfig {
    /// Changed files matching these globs never trigger a release
    pub ignore_changes: Vec<String>,

    /// Package-name globs that are always released; `"*"` releases everything
    pub force_publish: Vec<String>,

    /// Default reference to compare against instead of the latest tag
    pub since: Option<String>,
}

impl UpdatesConfig {
    /// The forced-publish spec described by this section
    pub fn forced_spec(&self) -> ForcedSpec {
        ForcedSpec::from_patterns(&self.force_publish)
    }
}
