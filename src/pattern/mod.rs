//! Pattern matching for security rule evaluation.
//!
//! This module handles:
//! - Caching compiled patterns by source text
//! - Holding a pattern in use while it is matched
//! - Rejecting oversized subjects before matching

pub mod cache;
pub mod matcher;

// Re-export main types
pub use cache::{CompiledPattern, PatternCache, PatternGuard, RegexCache};
pub use matcher::{MatchResult, PatternMatcher};
