//! CLI command implementations.
//!
//! Commands orchestrate the library primitives for manual inspection and
//! for scripts around the agent.

pub mod probe;
pub mod stack;

// Re-export main command functions
pub use probe::{parse_mode, run_inode, run_list, run_match, run_mkdir, run_same_day, run_scheme};
pub use stack::{execute_stack, load_config, StackArgs};
