//! Configuration and constants for the agent utilities.

use super::error::ConfigError;
use log::debug;
use serde::Deserialize;
use std::path::Path;

/// Tag prefixed to every diagnostic forwarded to the host log channel
pub const PRODUCT_TAG: &str = "[RASP]";

/// Default number of stack frames kept in a captured trace
pub const DEFAULT_LOG_MAXSTACK: usize = 50;

/// Default permission bits for log and plugin directories
pub const DEFAULT_DIR_MODE: u32 = 0o755;

/// Default number of compiled patterns kept by the regex cache
pub const DEFAULT_PATTERN_CACHE_CAPACITY: usize = 4096;

/// Longest subject the matcher accepts. Lengths are tracked as signed 32-bit
/// offsets by the host engine, so anything above `i32::MAX` is rejected.
pub const MAX_SUBJECT_LEN: usize = i32::MAX as usize;

/// Seconds in one day, used for day bucketing
pub const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Agent-wide settings consumed by this crate
///
/// **Public** - read by stack capture and the pattern cache
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Maximum stack frames retained per capture (`log.maxstack`)
    pub log_maxstack: usize,

    /// Maximum compiled patterns held by the cache
    pub pattern_cache_capacity: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            log_maxstack: DEFAULT_LOG_MAXSTACK,
            pattern_cache_capacity: DEFAULT_PATTERN_CACHE_CAPACITY,
        }
    }
}

impl AgentConfig {
    /// Parse configuration from TOML text. Missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load configuration from a TOML file
    ///
    /// **Public** - used by the CLI `--config` flag
    ///
    /// # Errors
    /// * `ConfigError::ReadFailed` - file could not be read
    /// * `ConfigError::InvalidFormat` - file is not valid TOML for this schema
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!("Loading agent config from: {}", path.display());
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn with_log_maxstack(mut self, log_maxstack: usize) -> Self {
        self.log_maxstack = log_maxstack;
        self
    }
}
