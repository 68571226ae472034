//! Call stack capture and serialization.
//!
//! This module handles:
//! - Reading frames from the host stack inspection facility
//! - Bounding capture by the configured maximum depth
//! - Rendering text and compact backtraces

pub mod capture;
pub mod frame;
pub mod render;

// Re-export main types
pub use capture::{CapturedStack, StackCapture};
pub use frame::{JsonStackSource, Snapshot, StackFrame, StackSource, TraceEntry};
pub use render::{render_compact, render_text};
