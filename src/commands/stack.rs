//! Stack command implementation.
//!
//! The stack command:
//! 1. Loads agent configuration (for `log_maxstack`)
//! 2. Reads a host backtrace dump
//! 3. Renders it in text or compact form

use crate::stack::{JsonStackSource, StackCapture};
use crate::utils::config::AgentConfig;
use anyhow::{Context, Result};
use log::{debug, info};
use std::path::PathBuf;

/// Arguments for the stack command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone, Default)]
pub struct StackArgs {
    /// Path to a JSON backtrace dump
    pub input: PathBuf,

    /// Emit the compact form as a JSON array instead of text
    pub compact: bool,

    /// Override for the configured maximum depth
    pub max_stack: Option<usize>,

    /// Optional agent config file
    pub config: Option<PathBuf>,
}

/// Resolve the agent config from an optional file
///
/// **Public** - shared by commands that honour `--config`
pub fn load_config(path: Option<&PathBuf>) -> Result<AgentConfig> {
    match path {
        Some(path) => AgentConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(AgentConfig::default()),
    }
}

/// Execute the stack command
///
/// **Public** - main entry point called from main.rs
///
/// # Returns
/// The rendered backtrace, ready to print
///
/// # Errors
/// * Config file unreadable or invalid
/// * Input file unreadable or not JSON
pub fn execute_stack(args: &StackArgs) -> Result<String> {
    let mut config = load_config(args.config.as_ref())?;
    if let Some(max_stack) = args.max_stack {
        config = config.with_log_maxstack(max_stack);
    }

    info!("Reading backtrace dump: {}", args.input.display());
    let text = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let source = JsonStackSource::parse(&text).context("Backtrace dump is not valid JSON")?;

    let capture = StackCapture::from_config(&config);
    debug!("Keeping at most {} frames", capture.max_frames());

    if args.compact {
        let frames = capture.capture_compact(&source);
        Ok(serde_json::to_string_pretty(&frames)?)
    } else {
        Ok(capture.capture_text(&source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn dump_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_execute_stack_text() {
        let dump = dump_file(r#"[{"file":"/a.php","function":"exec","line":3},{"file":"/b.php"}]"#);
        let args = StackArgs {
            input: dump.path().to_path_buf(),
            max_stack: Some(1),
            ..Default::default()
        };
        assert_eq!(execute_stack(&args).unwrap(), "/a.php(exec:3)");
    }

    #[test]
    fn test_execute_stack_compact() {
        let dump = dump_file(r#"[{"file":"/a.php","function":"exec"},{"file":"/b.php"}]"#);
        let args = StackArgs {
            input: dump.path().to_path_buf(),
            compact: true,
            ..Default::default()
        };
        let output: Vec<String> = serde_json::from_str(&execute_stack(&args).unwrap()).unwrap();
        assert_eq!(output, vec!["/a.php@exec".to_string(), "/b.php".to_string()]);
    }

    #[test]
    fn test_execute_stack_uses_config_file() {
        let dump = dump_file(r#"[{"file":"/a.php"},{"file":"/b.php"},{"file":"/c.php"}]"#);
        let config = dump_file("log_maxstack = 2\n");
        let args = StackArgs {
            input: dump.path().to_path_buf(),
            config: Some(config.path().to_path_buf()),
            ..Default::default()
        };
        assert_eq!(execute_stack(&args).unwrap(), "/a.php(:-1)\n/b.php(:-1)");
    }

    #[test]
    fn test_execute_stack_bad_json() {
        let dump = dump_file("not json");
        let args = StackArgs {
            input: dump.path().to_path_buf(),
            ..Default::default()
        };
        assert!(execute_stack(&args).is_err());
    }
}
