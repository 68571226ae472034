//! Utility modules for configuration and error handling.

pub mod error;
pub mod config;

// Re-export commonly used types for convenience
pub use config::AgentConfig;
pub use error::{ConfigError, DirError, MatchError};
