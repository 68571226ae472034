//! RASP Diagnostics CLI
//!
//! Command-line access to the agent's diagnostic primitives: render host
//! backtraces, prepare storage directories, and probe paths, timestamps and
//! patterns the way the agent sees them.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use rasp_diag::commands::{
    execute_stack, load_config, parse_mode, run_inode, run_list, run_match, run_mkdir,
    run_same_day, run_scheme, StackArgs,
};
use rasp_diag::utils::config::{DEFAULT_LOG_MAXSTACK, PRODUCT_TAG};

/// RASP Diagnostics - agent utility probes
#[derive(Parser, Debug)]
#[command(name = "rasp-diag")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Agent config file (TOML)
    #[arg(short, long, global = true, env = "RASP_DIAG_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Render a JSON backtrace dump
    Stack {
        /// Path to the backtrace dump
        #[arg(short, long)]
        input: PathBuf,

        /// Print the compact `file@function` form as JSON
        #[arg(long)]
        compact: bool,

        /// Maximum frames to keep (overrides log_maxstack)
        #[arg(long)]
        max_stack: Option<usize>,
    },

    /// Make sure a directory and its ancestors exist
    Mkdir {
        /// Directory to create
        path: PathBuf,

        /// Permission bits in octal [default: 755]
        #[arg(long, value_parser = parse_mode)]
        mode: Option<u32>,
    },

    /// List a directory, optionally filtered by suffix
    Ls {
        /// Directory to list
        dir: PathBuf,

        /// Keep only names ending with this suffix
        #[arg(long)]
        suffix: Option<String>,
    },

    /// Print the inode of a regular file (0 otherwise)
    Inode {
        /// File to probe
        path: PathBuf,
    },

    /// Tell whether a value looks like `scheme://...`
    Scheme {
        /// Path-like value
        text: String,
    },

    /// Check whether two timestamps fall on the same local day
    SameDay {
        /// First timestamp (epoch seconds)
        #[arg(allow_hyphen_values = true)]
        src: i64,

        /// Second timestamp (epoch seconds)
        #[arg(allow_hyphen_values = true)]
        target: i64,

        /// Offset east of UTC in seconds (defaults to the local offset)
        #[arg(long, allow_hyphen_values = true)]
        offset: Option<i64>,
    },

    /// Match a pattern against a subject
    Match {
        /// Pattern source (`/body/flags` or bare)
        pattern: String,

        /// Subject text
        subject: String,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    match cli.command {
        Commands::Stack {
            input,
            compact,
            max_stack,
        } => {
            let args = StackArgs {
                input,
                compact,
                max_stack,
                config: cli.config,
            };
            println!("{}", execute_stack(&args)?);
        }

        Commands::Mkdir { path, mode } => {
            println!("{}", run_mkdir(&path, mode)?);
        }

        Commands::Ls { dir, suffix } => {
            for name in run_list(&dir, suffix.as_deref()) {
                println!("{}", name);
            }
        }

        Commands::Inode { path } => {
            println!("{}", run_inode(&path));
        }

        Commands::Scheme { text } => {
            println!("{}", run_scheme(&text));
        }

        Commands::SameDay {
            src,
            target,
            offset,
        } => {
            println!("{}", run_same_day(src, target, offset));
        }

        Commands::Match { pattern, subject } => {
            let config = load_config(cli.config.as_ref())?;
            println!("{}", run_match(&config, &pattern, &subject)?);
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}

/// Display version information
///
/// **Private** - internal command implementation
fn display_version() {
    println!("{} rasp-diag v{}", PRODUCT_TAG, env!("CARGO_PKG_VERSION"));
    println!("Default max stack: {}", DEFAULT_LOG_MAXSTACK);
}
