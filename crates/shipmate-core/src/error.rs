//! Error types for Shipmate

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using ShipmateError
pub type Result<T> = std::result::Result<T, ShipmateError>;

/// Main error type for Shipmate operations
#[derive(Debug, Error)]
pub enum ShipmateError {
    /// Configuration-related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Git-related errors
    #[error(transparent)]
    Git(#[from] GitError),

    /// Package graph errors
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// Glob pattern errors
    #[error(transparent)]
    Pattern(#[from] PatternError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found at {0}")]
    NotFound(PathBuf),

    /// Invalid configuration value
    #[error("Invalid configuration: {field} - {message}")]
    InvalidValue { field: String, message: String },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// IO error
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),
}

/// Git-related errors
#[derive(Debug, Error)]
pub enum GitError {
    /// Repository not found
    #[error("Git repository not found at {0}")]
    RepositoryNotFound(PathBuf),

    /// Not a git repository
    #[error("Not a git repository: {0}")]
    NotARepository(PathBuf),

    /// Failed to open repository
    #[error("Failed to open repository: {0}")]
    OpenFailed(String),

    /// No commits found
    #[error("No commits found in repository")]
    NoCommits,

    /// Revision could not be resolved
    #[error("Cannot resolve revision '{0}'")]
    InvalidRevision(String),

    /// Git2 library error
    #[error("Git error: {0}")]
    Git2(#[from] git2::Error),
}

/// Package graph errors
#[derive(Debug, Error)]
pub enum GraphError {
    /// Two packages share a name
    #[error("Duplicate package name '{name}' at {first} and {second}")]
    DuplicatePackage {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },

    /// Manifest could not be read
    #[error("Failed to read manifest {path}: {reason}")]
    ManifestUnreadable { path: PathBuf, reason: String },
}

/// Glob pattern errors
#[derive(Debug, Error)]
pub enum PatternError {
    /// Pattern failed to compile
    #[error("Invalid {option} pattern '{pattern}': {reason}")]
    InvalidGlob {
        option: &'static str,
        pattern: String,
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_error_names_option() {
        let err: ShipmateError = PatternError::InvalidGlob {
            option: "ignore_changes",
            pattern: "[".to_string(),
            reason: "unclosed character class".to_string(),
        }
        .into();

        let message = err.to_string();
        assert!(message.contains("ignore_changes"));
        assert!(message.contains("'['"));
    }

    #[test]
    fn test_every_variant_has_a_source() {
        let io: ShipmateError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(io, ShipmateError::Io(_)));

        let git: ShipmateError = GitError::InvalidRevision("v9".to_string()).into();
        assert!(matches!(git, ShipmateError::Git(_)));
        assert_eq!(git.to_string(), "Cannot resolve revision 'v9'");

        let config: ShipmateError = ConfigError::NotFound(PathBuf::from("/repo")).into();
        assert!(matches!(config, ShipmateError::Config(_)));
    }
}
