//! Compiled-pattern cache and the scoped in-use guard.
//!
//! Security rules match the same handful of patterns against every request, so
//! compiled regexes are kept in a bounded cache keyed by their source text.
//! A pattern that is being matched carries a non-zero in-use count and is never
//! evicted; eviction only reclaims idle entries.
//!
//! Pattern sources come in two forms:
//! - delimited: `/body/flags`, where the delimiter is any ASCII punctuation
//!   character except `\`; `(` `[` `{` `<` close with their matching bracket.
//!   Flags are `i m s x U u`.
//! - bare: sources starting with an alphanumeric or `\`, compiled as-is
//!
//! Leading whitespace is ignored.

use crate::utils::config::DEFAULT_PATTERN_CACHE_CAPACITY;
use log::debug;
use regex::{Regex, RegexBuilder};
use std::collections::HashMap;
use std::ops::Deref;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// A compiled pattern plus the number of matches currently using it
#[derive(Debug)]
pub struct CompiledPattern {
    source: String,
    regex: Regex,
    in_use: AtomicUsize,
}

impl CompiledPattern {
    /// Compile a pattern source
    ///
    /// **Public** - used by caches on a miss
    ///
    /// # Errors
    /// Human-readable reason when the source is malformed
    pub fn compile(source: &str) -> Result<Self, String> {
        let regex = build_regex(source)?;
        Ok(Self {
            source: source.to_string(),
            regex,
            in_use: AtomicUsize::new(0),
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Number of live guards on this pattern
    pub fn in_use(&self) -> usize {
        self.in_use.load(Ordering::Acquire)
    }
}

fn build_regex(source: &str) -> Result<Regex, String> {
    let source = source.trim_start_matches(|c: char| c.is_ascii_whitespace());
    let Some(open) = source.chars().next() else {
        return Err("Empty pattern".to_string());
    };
    if !is_delimiter(open) {
        return Regex::new(source).map_err(|e| e.to_string());
    }

    let (body, flags) = split_delimited(&source[open.len_utf8()..], open)?;

    let mut builder = RegexBuilder::new(body);
    for flag in flags.chars() {
        match flag {
            'i' => {
                builder.case_insensitive(true);
            }
            'm' => {
                builder.multi_line(true);
            }
            's' => {
                builder.dot_matches_new_line(true);
            }
            'x' => {
                builder.ignore_whitespace(true);
            }
            'U' => {
                builder.swap_greed(true);
            }
            // Always unicode-aware
            'u' => {}
            ' ' | '\n' | '\r' => {}
            other => return Err(format!("Unknown modifier '{}'", other)),
        }
    }

    builder.build().map_err(|e| e.to_string())
}

fn is_delimiter(c: char) -> bool {
    c.is_ascii_punctuation() && c != '\\'
}

fn closing_delimiter(open: char) -> char {
    match open {
        '(' => ')',
        '[' => ']',
        '{' => '}',
        '<' => '>',
        other => other,
    }
}

/// Split `body<close>flags`, skipping backslash escapes. Bracket delimiters nest.
fn split_delimited(rest: &str, open: char) -> Result<(&str, &str), String> {
    let close = closing_delimiter(open);
    let mut depth = 0usize;
    let mut escaped = false;

    for (i, c) in rest.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == close {
            if depth == 0 {
                return Ok((&rest[..i], &rest[i + c.len_utf8()..]));
            }
            depth -= 1;
        } else if c == open {
            depth += 1;
        }
    }

    Err(format!("No ending delimiter '{}' found", close))
}

/// Holds a pattern in use for the lifetime of the guard
///
/// The in-use count goes up on `acquire` and back down on drop, so every exit
/// path of a match releases the pattern.
#[derive(Debug)]
pub struct PatternGuard {
    pattern: Arc<CompiledPattern>,
}

impl PatternGuard {
    pub fn acquire(pattern: Arc<CompiledPattern>) -> Self {
        pattern.in_use.fetch_add(1, Ordering::AcqRel);
        Self { pattern }
    }
}

impl Deref for PatternGuard {
    type Target = CompiledPattern;

    fn deref(&self) -> &CompiledPattern {
        &self.pattern
    }
}

impl Drop for PatternGuard {
    fn drop(&mut self) {
        self.pattern.in_use.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Source of compiled patterns, owned outside the matcher
pub trait PatternCache {
    /// Look up or compile `source`. `None` when it cannot be compiled.
    fn compiled(&self, source: &str) -> Option<Arc<CompiledPattern>>;
}

impl<T: PatternCache + ?Sized> PatternCache for &T {
    fn compiled(&self, source: &str) -> Option<Arc<CompiledPattern>> {
        (**self).compiled(source)
    }
}

impl<T: PatternCache + ?Sized> PatternCache for Arc<T> {
    fn compiled(&self, source: &str) -> Option<Arc<CompiledPattern>> {
        (**self).compiled(source)
    }
}

/// Bounded in-process cache of compiled regexes
#[derive(Debug)]
pub struct RegexCache {
    capacity: usize,
    entries: Mutex<HashMap<String, Arc<CompiledPattern>>>,
}

impl RegexCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn contains(&self, source: &str) -> bool {
        self.lock().contains_key(source)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Arc<CompiledPattern>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for RegexCache {
    fn default() -> Self {
        Self::new(DEFAULT_PATTERN_CACHE_CAPACITY)
    }
}

impl PatternCache for RegexCache {
    fn compiled(&self, source: &str) -> Option<Arc<CompiledPattern>> {
        let mut entries = self.lock();
        if let Some(pattern) = entries.get(source) {
            return Some(Arc::clone(pattern));
        }

        let pattern = match CompiledPattern::compile(source) {
            Ok(pattern) => Arc::new(pattern),
            Err(e) => {
                debug!("Pattern {:?} failed to compile: {}", source, e);
                return None;
            }
        };

        if entries.len() >= self.capacity {
            let excess = entries.len() + 1 - self.capacity;
            let idle: Vec<String> = entries
                .iter()
                .filter(|(_, p)| p.in_use() == 0)
                .map(|(key, _)| key.clone())
                .take(excess)
                .collect();
            debug!("Pattern cache full, evicting {} idle entries", idle.len());
            for key in idle {
                entries.remove(&key);
            }
        }

        if entries.len() < self.capacity {
            entries.insert(source.to_string(), Arc::clone(&pattern));
        } else {
            debug!("Pattern cache holds only in-use entries, not caching {:?}", source);
        }

        Some(pattern)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_pattern() {
        let pattern = CompiledPattern::compile(r"\d{3}").unwrap();
        assert!(pattern.regex().is_match("x123"));

        let pattern = CompiledPattern::compile("select").unwrap();
        assert!(!pattern.regex().is_match("SELECT"));
    }

    #[test]
    fn test_bracket_delimiters() {
        let pattern = CompiledPattern::compile("{abc}i").unwrap();
        assert!(pattern.regex().is_match("ABC"));

        let pattern = CompiledPattern::compile("(abc)i").unwrap();
        assert!(pattern.regex().is_match("xAbC"));

        // Nested brackets stay in the body
        let pattern = CompiledPattern::compile("[a[0-9]b]").unwrap();
        assert_eq!(pattern.regex().as_str(), "a[0-9]b");
        assert!(pattern.regex().is_match("a7b"));

        let pattern = CompiledPattern::compile(r"<\d+>").unwrap();
        assert!(pattern.regex().is_match("id=42"));
    }

    #[test]
    fn test_punctuation_delimiters() {
        let pattern = CompiledPattern::compile("+abc+").unwrap();
        assert!(pattern.regex().is_match("abc"));

        let pattern = CompiledPattern::compile("^etc/passwd^i").unwrap();
        assert!(pattern.regex().is_match("/ETC/passwd"));

        // An escaped delimiter does not end the body
        let pattern = CompiledPattern::compile(r"+a\+b+").unwrap();
        assert_eq!(pattern.regex().as_str(), r"a\+b");
        assert!(pattern.regex().is_match("a+b"));
    }

    #[test]
    fn test_leading_whitespace_and_flag_spacing() {
        let pattern = CompiledPattern::compile("  /abc/ i").unwrap();
        assert!(pattern.regex().is_match("ABC"));
    }

    #[test]
    fn test_delimited_with_flags() {
        let pattern = CompiledPattern::compile("/select.+from/is").unwrap();
        assert!(pattern.regex().is_match("SELECT *\nFROM users"));

        let pattern = CompiledPattern::compile("#etc/passwd#").unwrap();
        assert!(pattern.regex().is_match("../../etc/passwd"));
    }

    #[test]
    fn test_bad_sources() {
        assert!(CompiledPattern::compile("/unterminated").is_err());
        assert!(CompiledPattern::compile("/abc/q").is_err());
        assert!(CompiledPattern::compile("(").is_err());
        assert!(CompiledPattern::compile("{abc").is_err());
        assert!(CompiledPattern::compile("").is_err());
        assert!(CompiledPattern::compile("   ").is_err());
    }

    #[test]
    fn test_guard_counts() {
        let pattern = Arc::new(CompiledPattern::compile("a").unwrap());
        {
            let _first = PatternGuard::acquire(Arc::clone(&pattern));
            let _second = PatternGuard::acquire(Arc::clone(&pattern));
            assert_eq!(pattern.in_use(), 2);
        }
        assert_eq!(pattern.in_use(), 0);
    }

    #[test]
    fn test_cache_hit_returns_same_pattern() {
        let cache = RegexCache::new(4);
        let a = cache.compiled("/x/").unwrap();
        let b = cache.compiled("/x/").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_invalid_pattern_not_cached() {
        let cache = RegexCache::new(4);
        assert!(cache.compiled("/x").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_eviction_skips_in_use() {
        let cache = RegexCache::new(1);
        let held = PatternGuard::acquire(cache.compiled("a").unwrap());

        // Full of in-use entries: served but not cached
        assert!(cache.compiled("b").is_some());
        assert!(cache.contains("a"));
        assert!(!cache.contains("b"));

        drop(held);
        assert!(cache.compiled("b").is_some());
        assert!(!cache.contains("a"));
        assert!(cache.contains("b"));
    }

    #[test]
    fn test_zero_capacity_never_caches() {
        let cache = RegexCache::new(0);
        assert!(cache.compiled("a").is_some());
        assert!(cache.is_empty());
    }
}
