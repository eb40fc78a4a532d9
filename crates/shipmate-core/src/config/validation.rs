//! Configuration validation

use tracing::debug;

use crate::error::{ConfigError, Result};
use crate::monorepo::{ChangeFilter, ForcedPackages};

use super::types::Config;

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    debug!("validating configuration");
    validate_packages(config)?;
    validate_updates(config)?;
    debug!("configuration validation passed");
    Ok(())
}

fn validate_packages(config: &Config) -> Result<()> {
    if config.packages.is_empty() {
        return Err(ConfigError::InvalidValue {
            field: "packages".to_string(),
            message: "at least one package pattern is required".to_string(),
        }
        .into());
    }

    for (i, pattern) in config.packages.iter().enumerate() {
        if pattern.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: format!("packages[{}]", i),
                message: "package pattern cannot be empty".to_string(),
            }
            .into());
        }

        if let Err(e) = glob::Pattern::new(pattern) {
            return Err(ConfigError::InvalidValue {
                field: format!("packages[{}]", i),
                message: e.to_string(),
            }
            .into());
        }
    }

    Ok(())
}

fn validate_updates(config: &Config) -> Result<()> {
    ChangeFilter::new(&config.updates.ignore_changes)?;
    ForcedPackages::compile(&config.updates.forced_spec())?;

    if config.updates.since.as_deref().is_some_and(|s| s.trim().is_empty()) {
        return Err(ConfigError::InvalidValue {
            field: "updates.since".to_string(),
            message: "since cannot be empty; omit it to compare with the latest tag".to_string(),
        }
        .into());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        let config = Config::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_requires_package_patterns() {
        let mut config = Config::default();
        config.packages.clear();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_bad_package_pattern() {
        let mut config = Config::default();
        config.packages = vec!["packages/[".to_string()];
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_bad_ignore_glob() {
        let mut config = Config::default();
        config.updates.ignore_changes = vec!["docs/{a".to_string()];
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("ignore_changes"));
    }

    #[test]
    fn test_validate_bad_force_publish_glob() {
        let mut config = Config::default();
        config.updates.force_publish = vec!["[oops".to_string()];
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("force_publish"));
    }

    #[test]
    fn test_validate_blank_since() {
        let mut config = Config::default();
        config.updates.since = Some("  ".to_string());
        assert!(validate_config(&config).is_err());
    }
}
