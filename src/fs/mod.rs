//! Filesystem primitives used before writing logs and during plugin discovery.

pub mod dirs;
pub mod identity;

// Re-export main functions
pub use dirs::{ensure_dir, list_filtered, list_with_suffix};
pub use identity::{inode_of, was_replaced};
