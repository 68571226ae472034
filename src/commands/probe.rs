//! Small probe commands wrapping the filesystem, scheme, time and pattern primitives.

use crate::fs::{ensure_dir, inode_of, list_filtered};
use crate::pattern::{PatternMatcher, RegexCache};
use crate::scheme::url_scheme;
use crate::time::{local_utc_offset, same_local_day};
use crate::utils::config::{AgentConfig, DEFAULT_DIR_MODE};
use anyhow::{Context, Result};
use log::info;
use std::path::Path;

/// Parse permission bits written in octal (`755`, `0755`, `0o755`)
///
/// **Public** - clap value parser for `--mode`
pub fn parse_mode(text: &str) -> Result<u32, String> {
    let digits = text.strip_prefix("0o").unwrap_or(text);
    u32::from_str_radix(digits, 8)
        .ok()
        .filter(|mode| *mode <= 0o7777)
        .ok_or_else(|| format!("invalid octal mode: {}", text))
}

/// Make sure a directory exists, with `DEFAULT_DIR_MODE` unless a mode is given
pub fn run_mkdir(path: &Path, mode: Option<u32>) -> Result<String> {
    let mode = mode.unwrap_or(DEFAULT_DIR_MODE);
    ensure_dir(path, mode).with_context(|| format!("Failed to ensure {}", path.display()))?;
    info!("Directory ready: {}", path.display());
    Ok(format!("✓ {}", path.display()))
}

/// List a directory, optionally keeping only names with a suffix
pub fn run_list(dir: &Path, suffix: Option<&str>) -> Vec<String> {
    match suffix {
        Some(suffix) => list_filtered(dir, |name| name.ends_with(suffix)),
        None => list_filtered(dir, |_| true),
    }
}

/// Inode of a regular file, 0 otherwise
pub fn run_inode(path: &Path) -> u64 {
    inode_of(path)
}

/// Describe the scheme of a path-like value
pub fn run_scheme(text: &str) -> String {
    match url_scheme(text) {
        Some(scheme) => format!("remote ({})", scheme),
        None => "local".to_string(),
    }
}

/// Same-day check, defaulting to the current local offset
pub fn run_same_day(src: i64, target: i64, offset: Option<i64>) -> bool {
    same_local_day(src, target, offset.unwrap_or_else(local_utc_offset))
}

/// Match a pattern against a subject and return the result as JSON
///
/// # Errors
/// * Subject too long or pattern unavailable
pub fn run_match(config: &AgentConfig, pattern: &str, subject: &str) -> Result<String> {
    let matcher = PatternMatcher::new(RegexCache::new(config.pattern_cache_capacity));
    let result = matcher
        .find(pattern, subject)
        .with_context(|| format!("Failed to match {:?}", pattern))?;
    Ok(serde_json::to_string_pretty(&result)?)
}
