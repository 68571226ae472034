//! Error types for the entire library.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while ensuring a directory exists
#[derive(Error, Debug)]
pub enum DirError {
    #[error("Could not create directory '{}': {source}", path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Path exists but is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
}

/// Errors that can occur during a guarded pattern match
#[derive(Error, Debug, PartialEq, Eq)]
pub enum MatchError {
    #[error("Subject of {len} bytes exceeds the matcher limit of {max} bytes")]
    SubjectTooLong { len: usize, max: usize },

    #[error("Pattern unavailable: {0}")]
    PatternUnavailable(String),
}

/// Errors that can occur while loading agent configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadFailed(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    InvalidFormat(#[from] toml::de::Error),
}
