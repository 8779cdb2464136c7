//! Command-line interface definitions for filedup.
//!
//! This module defines all CLI arguments and options using the clap derive API.
//! Boolean flags only ever switch a behaviour on; when a flag is absent the
//! value from the configuration file or environment applies.
//!
//! # Example
//!
//! ```bash
//! # Find duplicates across two trees
//! filedup ~/Downloads ~/Documents
//!
//! # Only report files that share a size
//! filedup --skip-hash ~/Downloads
//!
//! # JSON output with BLAKE3 and 8 workers
//! filedup -o json --algorithm blake3 -j 8 ~/Downloads
//! ```

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::scanner::HashAlgorithm;

/// Find duplicate files across directory trees by content.
///
/// Files are first grouped by size; only files that share a size are
/// hashed, and files with the same digest are reported as duplicates.
#[derive(Debug, Parser)]
#[command(name = "filedup")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directories to search (each must exist and be a directory)
    #[arg(value_name = "DIRS")]
    pub dirs: Vec<PathBuf>,

    /// Report files that share a size without hashing their content
    #[arg(long)]
    pub skip_hash: bool,

    /// Digest algorithm used to confirm duplicates
    #[arg(long, value_enum, value_name = "ALGO")]
    pub algorithm: Option<HashAlgorithm>,

    /// Number of worker threads (0 = available parallelism)
    #[arg(short = 'j', long, value_name = "N")]
    pub threads: Option<usize>,

    /// Descend into symlinked directories
    ///
    /// Symlinks to files are always counted as files.
    ///
    /// Warning: May cause infinite loops if symlinks form cycles.
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Drop roots that repeat or lie inside another root
    #[arg(long)]
    pub dedupe_roots: bool,

    /// Abort on the first unreadable file instead of skipping it
    #[arg(long)]
    pub strict: bool,

    /// Output format
    #[arg(short, long, value_enum, value_name = "FORMAT")]
    pub output: Option<OutputFormat>,

    /// Disable progress bars
    #[arg(long)]
    pub no_progress: bool,

    /// Path to a TOML configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors and results
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Print errors as JSON objects on stderr
    #[arg(long)]
    pub json_errors: bool,
}

/// Output format for scan results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable group listing
    #[default]
    Text,
    /// JSON output for scripting
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
