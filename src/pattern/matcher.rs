//! Guarded single-shot matching against the compiled-pattern cache.

use super::cache::{PatternCache, PatternGuard};
use crate::utils::config::MAX_SUBJECT_LEN;
use crate::utils::error::MatchError;
use log::debug;
use regex::Captures;
use serde::Serialize;

/// Outcome of a successful match
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    /// Capture groups, group 0 (the whole match) first; `None` for groups that did not take part
    pub groups: Vec<Option<String>>,

    /// Byte offset where the whole match starts
    pub start: usize,

    /// Byte offset just past the whole match
    pub end: usize,
}

impl MatchResult {
    fn from_captures(captures: &Captures<'_>) -> Self {
        let whole = captures.get(0);
        Self {
            groups: captures
                .iter()
                .map(|group| group.map(|m| m.as_str().to_string()))
                .collect(),
            start: whole.map_or(0, |m| m.start()),
            end: whole.map_or(0, |m| m.end()),
        }
    }

    /// The text of the whole match
    pub fn matched(&self) -> &str {
        self.groups
            .first()
            .and_then(|g| g.as_deref())
            .unwrap_or("")
    }
}

/// Matches request data against patterns borrowed from a cache
///
/// **Public** - used by the rule engine
#[derive(Debug)]
pub struct PatternMatcher<C> {
    cache: C,
    max_subject_len: usize,
}

impl<C: PatternCache> PatternMatcher<C> {
    pub fn new(cache: C) -> Self {
        Self {
            cache,
            max_subject_len: MAX_SUBJECT_LEN,
        }
    }

    /// Lower the subject size bound
    pub fn with_max_subject_len(mut self, max_subject_len: usize) -> Self {
        self.max_subject_len = max_subject_len;
        self
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Run one match of `source` against `subject` from offset 0
    ///
    /// **Public** - main entry point for rule evaluation
    ///
    /// # Returns
    /// `Some` with the captures of the first match, `None` when nothing matched
    ///
    /// # Errors
    /// * `MatchError::SubjectTooLong` - subject exceeds the size bound; the cache is not consulted
    /// * `MatchError::PatternUnavailable` - the pattern could not be compiled or retrieved
    pub fn find(&self, source: &str, subject: &str) -> Result<Option<MatchResult>, MatchError> {
        if subject.len() > self.max_subject_len {
            return Err(MatchError::SubjectTooLong {
                len: subject.len(),
                max: self.max_subject_len,
            });
        }

        let pattern = self
            .cache
            .compiled(source)
            .ok_or_else(|| MatchError::PatternUnavailable(source.to_string()))?;

        let guard = PatternGuard::acquire(pattern);
        let result = guard
            .regex()
            .captures(subject)
            .map(|captures| MatchResult::from_captures(&captures));

        debug!(
            "Pattern {:?} {} subject of {} bytes",
            guard.source(),
            if result.is_some() { "matched" } else { "did not match" },
            subject.len()
        );

        Ok(result)
    }

    /// Whether `source` matches anywhere in `subject`
    pub fn is_match(&self, source: &str, subject: &str) -> Result<bool, MatchError> {
        Ok(self.find(source, subject)?.is_some())
    }
}
