//! RASP Diagnostics
//!
//! Diagnostic capture and safe-resource utilities for a runtime security
//! agent embedded in an interpreter.
//!
//! The pieces are independent and are driven by the agent's hook handlers
//! and rule engine:
//!
//! - [`stack`] - call stack capture with text and compact renderings
//! - [`fs`] - directory ensuring, filtered listing, inode probes
//! - [`scheme`] - `scheme://` sniffing for path-like values
//! - [`time`] - same-local-day checks for log rollover
//! - [`pattern`] - guarded matching against a compiled-pattern cache
//! - [`diagnostics`] - coded warnings forwarded to the host log channel
//!
//! ## Getting Started
//!
//! ```bash
//! cargo install rasp-diag
//! rasp-diag --help
//! ```

pub mod commands;
pub mod diagnostics;
pub mod fs;
pub mod pattern;
pub mod scheme;
pub mod stack;
pub mod time;
pub mod utils;
