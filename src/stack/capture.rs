//! Backtrace capture bounded by the configured maximum stack depth.

use super::frame::StackSource;
use super::render::{render_compact, render_text};
use crate::utils::config::AgentConfig;
use log::debug;
use serde::Serialize;

/// Both renderings of one snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CapturedStack {
    pub text: String,
    pub compact: Vec<String>,
}

/// Captures the current call stack from a host source
///
/// **Public** - used by hook handlers when an event needs a stack trace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackCapture {
    max_frames: usize,
}

impl StackCapture {
    pub fn new(max_frames: usize) -> Self {
        Self { max_frames }
    }

    /// Use `log_maxstack` from the agent configuration
    pub fn from_config(config: &AgentConfig) -> Self {
        Self::new(config.log_maxstack)
    }

    pub fn max_frames(&self) -> usize {
        self.max_frames
    }

    /// Capture and render as newline-separated text
    ///
    /// # Returns
    /// Empty string when the source has no snapshot
    pub fn capture_text(&self, source: &impl StackSource) -> String {
        match source.snapshot() {
            Some(snapshot) => render_text(snapshot.entries(), self.max_frames),
            None => {
                debug!("No backtrace available from host");
                String::new()
            }
        }
    }

    /// Capture and render as one `file@function` string per frame
    pub fn capture_compact(&self, source: &impl StackSource) -> Vec<String> {
        match source.snapshot() {
            Some(snapshot) => render_compact(snapshot.entries(), self.max_frames),
            None => {
                debug!("No backtrace available from host");
                Vec::new()
            }
        }
    }

    /// Capture once and render both forms from the same snapshot
    pub fn capture_both(&self, source: &impl StackSource) -> CapturedStack {
        let Some(snapshot) = source.snapshot() else {
            debug!("No backtrace available from host");
            return CapturedStack::default();
        };

        debug!(
            "Rendering backtrace: {} entries, keeping at most {}",
            snapshot.len(),
            self.max_frames
        );

        CapturedStack {
            text: render_text(snapshot.entries(), self.max_frames),
            compact: render_compact(snapshot.entries(), self.max_frames),
        }
    }
}

impl Default for StackCapture {
    fn default() -> Self {
        Self::from_config(&AgentConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stack::frame::{Snapshot, StackFrame};
    use crate::utils::config::DEFAULT_LOG_MAXSTACK;
    use std::cell::Cell;

    #[test]
    fn test_default_uses_config_limit() {
        assert_eq!(StackCapture::default().max_frames(), DEFAULT_LOG_MAXSTACK);
        let config = AgentConfig::default().with_log_maxstack(3);
        assert_eq!(StackCapture::from_config(&config).max_frames(), 3);
    }

    #[test]
    fn test_missing_snapshot_renders_empty() {
        let capture = StackCapture::new(10);
        let source = || -> Option<Snapshot> { None };
        assert_eq!(capture.capture_text(&source), "");
        assert!(capture.capture_compact(&source).is_empty());
        assert_eq!(capture.capture_both(&source), CapturedStack::default());
    }

    #[test]
    fn test_each_capture_takes_fresh_snapshot() {
        let calls = Cell::new(0);
        let source = || {
            calls.set(calls.get() + 1);
            Some(Snapshot::from_frames(vec![StackFrame::new("/a.php", "f", 1)]))
        };
        let capture = StackCapture::new(10);

        capture.capture_text(&source);
        capture.capture_compact(&source);
        let both = capture.capture_both(&source);

        assert_eq!(calls.get(), 3);
        assert_eq!(both.text, "/a.php(f:1)");
        assert_eq!(both.compact, vec!["/a.php@f".to_string()]);
    }
}
