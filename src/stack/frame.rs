//! Stack frame records and the host stack inspection seam.
//!
//! The host runtime hands out a backtrace as an ordered list of records, newest
//! call first. Records are loosely typed on the host side, so a field of the
//! wrong type is treated as missing and a record that is not a frame at all is
//! kept as an opaque placeholder the renderers skip.

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single call frame as reported by the host runtime
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackFrame {
    /// Source file of the call site
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Called function name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,

    /// Line number of the call site
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<i64>,
}

impl StackFrame {
    pub fn new(file: impl Into<String>, function: impl Into<String>, line: i64) -> Self {
        Self {
            file: Some(file.into()),
            function: Some(function.into()),
            line: Some(line),
        }
    }

    /// Read a frame from one host backtrace record
    ///
    /// **Public** - used by `Snapshot::from_json`
    ///
    /// Returns `None` when the record is not an object. Fields with an
    /// unexpected type are dropped instead of failing the whole frame.
    pub fn from_value(value: &Value) -> Option<Self> {
        let record = value.as_object()?;
        Some(Self {
            file: record.get("file").and_then(Value::as_str).map(str::to_string),
            function: record
                .get("function")
                .and_then(Value::as_str)
                .map(str::to_string),
            line: record.get("line").and_then(Value::as_i64),
        })
    }
}

/// One element of a host backtrace
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceEntry {
    Frame(StackFrame),
    /// Anything the host put in the list that is not a frame record
    Opaque,
}

impl From<StackFrame> for TraceEntry {
    fn from(frame: StackFrame) -> Self {
        TraceEntry::Frame(frame)
    }
}

/// An owned, single-use backtrace snapshot, newest call first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    entries: Vec<TraceEntry>,
}

impl Snapshot {
    pub fn new(entries: Vec<TraceEntry>) -> Self {
        Self { entries }
    }

    pub fn from_frames(frames: impl IntoIterator<Item = StackFrame>) -> Self {
        Self::new(frames.into_iter().map(TraceEntry::Frame).collect())
    }

    /// Build a snapshot from a host backtrace dump
    ///
    /// **Public** - entry point for JSON-shaped host backtraces
    ///
    /// # Returns
    /// `None` when the dump is not an array
    pub fn from_json(value: &Value) -> Option<Self> {
        let Some(records) = value.as_array() else {
            debug!("Host backtrace is not a list, ignoring");
            return None;
        };

        let entries = records
            .iter()
            .map(|record| match StackFrame::from_value(record) {
                Some(frame) => TraceEntry::Frame(frame),
                None => TraceEntry::Opaque,
            })
            .collect();

        Some(Self { entries })
    }

    pub fn entries(&self) -> &[TraceEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Host stack inspection facility
///
/// `None` means the host could not produce a backtrace. The returned snapshot
/// is owned by the caller and released when dropped.
pub trait StackSource {
    fn snapshot(&self) -> Option<Snapshot>;
}

impl StackSource for Snapshot {
    fn snapshot(&self) -> Option<Snapshot> {
        Some(self.clone())
    }
}

impl<F> StackSource for F
where
    F: Fn() -> Option<Snapshot>,
{
    fn snapshot(&self) -> Option<Snapshot> {
        self()
    }
}

/// A stack source backed by a JSON backtrace dump
#[derive(Debug, Clone)]
pub struct JsonStackSource {
    dump: Value,
}

impl JsonStackSource {
    pub fn new(dump: Value) -> Self {
        Self { dump }
    }

    /// Parse a dump from text
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        Ok(Self::new(serde_json::from_str(text)?))
    }
}

impl StackSource for JsonStackSource {
    fn snapshot(&self) -> Option<Snapshot> {
        Snapshot::from_json(&self.dump)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_frame_from_value_full() {
        let frame = StackFrame::from_value(&json!({
            "file": "/var/www/index.php",
            "function": "include",
            "line": 12
        }))
        .unwrap();
        assert_eq!(frame, StackFrame::new("/var/www/index.php", "include", 12));
    }

    #[test]
    fn test_frame_wrong_types_dropped() {
        let frame = StackFrame::from_value(&json!({
            "file": 7,
            "function": ["x"],
            "line": "12"
        }))
        .unwrap();
        assert_eq!(frame, StackFrame::default());
    }

    #[test]
    fn test_non_object_is_opaque() {
        let snapshot = Snapshot::from_json(&json!([{"file": "a.php"}, "junk", 3])).unwrap();
        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot.entries()[1], TraceEntry::Opaque);
        assert_eq!(snapshot.entries()[2], TraceEntry::Opaque);
    }

    #[test]
    fn test_non_array_dump_has_no_snapshot() {
        assert!(Snapshot::from_json(&json!({"file": "a.php"})).is_none());
        assert!(JsonStackSource::new(Value::Null).snapshot().is_none());
    }
}
