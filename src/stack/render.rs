//! Text and compact renderings of a captured backtrace.
//!
//! Text form (one line per frame, used in alarm logs):
//!   "/var/www/index.php(include:12)"
//!
//! Compact form (one string per frame, used for plugin input and comparisons):
//!   "/var/www/index.php@include"
//!
//! Both renderers process at most `limit` entries. Opaque entries are skipped
//! but still count against the limit.

use super::frame::{StackFrame, TraceEntry};

/// Frames that survive the entry limit, newest first
fn retained(entries: &[TraceEntry], limit: usize) -> impl Iterator<Item = &StackFrame> {
    entries.iter().take(limit).filter_map(|entry| match entry {
        TraceEntry::Frame(frame) => Some(frame),
        TraceEntry::Opaque => None,
    })
}

/// Render one frame as `file(function:line)`, with `-1` for a missing line
///
/// **Public** - also used when logging a single call site
pub fn frame_to_line(frame: &StackFrame) -> String {
    let file = frame.file.as_deref().unwrap_or("");
    let function = frame.function.as_deref().unwrap_or("");
    let line = frame.line.unwrap_or(-1);
    format!("{}({}:{})", file, function, line)
}

/// Render one frame as `file` or `file@function`
pub fn frame_to_compact(frame: &StackFrame) -> String {
    let file = frame.file.as_deref().unwrap_or("");
    match frame.function.as_deref() {
        Some(function) => format!("{}@{}", file, function),
        None => file.to_string(),
    }
}

/// Render entries as newline-separated text
///
/// **Public** - text serialization of a backtrace
///
/// # Returns
/// One line per retained frame, no trailing newline; empty when no frame is retained
pub fn render_text(entries: &[TraceEntry], limit: usize) -> String {
    retained(entries, limit)
        .map(frame_to_line)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render entries as one string per retained frame
///
/// **Public** - compact serialization of a backtrace
pub fn render_compact(entries: &[TraceEntry], limit: usize) -> Vec<String> {
    retained(entries, limit).map(frame_to_compact).collect()
}
