//! JSON output formatter for duplicate scan results.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "mode": "digest",
//!   "algorithm": "sha256",
//!   "groups": [
//!     { "key": "2d71...4881", "size": 1, "files": ["/data/a.txt", "/data/b.txt"] }
//!   ],
//!   "summary": {
//!     "total_files": 4,
//!     "duplicate_groups": 1,
//!     "skipped_files": ["/data/locked.bin: Permission denied"],
//!     "exit_code": 0
//!   }
//! }
//! ```
//!
//! In size mode `mode` is `"size"`, `algorithm` is `null` and every `key`
//! is the byte size.

use std::io::Write;

use serde::Serialize;

use crate::duplicates::{Duplicates, GroupKey, ScanSummary};
use crate::error::ExitCode;

/// A single group in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonGroup {
    /// Digest string or byte size
    pub key: GroupKey,
    /// Size of each member in bytes, if known
    pub size: Option<u64>,
    /// Member paths in discovery order
    pub files: Vec<String>,
}

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Roots that were walked
    pub roots: Vec<String>,
    /// Total number of regular files discovered
    pub total_files: usize,
    /// Total size of all discovered files in bytes
    pub total_size: u64,
    /// Files that shared a size with another file
    pub candidate_files: usize,
    /// Files whose content was hashed
    pub hashed_files: usize,
    /// Number of result groups
    pub duplicate_groups: usize,
    /// Files in groups, excluding one original per group
    pub duplicate_files: usize,
    /// Bytes held by the duplicate copies
    pub reclaimable_space: u64,
    /// Files skipped because they could not be read
    pub skipped_files: Vec<String>,
    /// Duration of the scan in milliseconds
    pub scan_duration_ms: u64,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "FD000")
    pub exit_code_name: String,
}

impl JsonSummary {
    /// Create a JSON summary from a [`ScanSummary`] and an exit code.
    #[must_use]
    pub fn from_scan_summary(summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            roots: summary
                .roots
                .iter()
                .map(|r| r.to_string_lossy().into_owned())
                .collect(),
            total_files: summary.total_files,
            total_size: summary.total_size,
            candidate_files: summary.candidate_files,
            hashed_files: summary.hashed_files,
            duplicate_groups: summary.duplicate_groups,
            duplicate_files: summary.duplicate_files,
            reclaimable_space: summary.reclaimable_space,
            skipped_files: summary.errors.iter().map(ToString::to_string).collect(),
            scan_duration_ms: summary.scan_duration.as_millis() as u64,
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix().to_string(),
        }
    }
}

/// Complete JSON output structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// `"size"` or `"digest"`
    pub mode: &'static str,
    /// Digest algorithm, absent in size mode
    pub algorithm: Option<&'static str>,
    /// Groups sorted by key
    pub groups: Vec<JsonGroup>,
    /// Scan summary statistics
    pub summary: JsonSummary,
}

impl JsonOutput {
    /// Build the document from a result, its summary and the exit code.
    ///
    /// ```
    /// use filedup::duplicates::{Duplicates, ScanSummary};
    /// use filedup::error::ExitCode;
    /// use filedup::output::JsonOutput;
    ///
    /// let output = JsonOutput::new(&Duplicates::default(), &ScanSummary::default(), ExitCode::Success);
    /// assert!(output.groups.is_empty());
    /// assert_eq!(output.mode, "digest");
    /// ```
    #[must_use]
    pub fn new(duplicates: &Duplicates, summary: &ScanSummary, exit_code: ExitCode) -> Self {
        let groups = duplicates
            .sorted()
            .into_iter()
            .map(|(key, files)| JsonGroup {
                size: summary.group_size(&key),
                key,
                files: files
                    .iter()
                    .map(|f| f.to_string_lossy().into_owned())
                    .collect(),
            })
            .collect();

        Self {
            mode: if duplicates.is_by_size() { "size" } else { "digest" },
            algorithm: summary.hash_algorithm,
            groups,
            summary: JsonSummary::from_scan_summary(summary, exit_code),
        }
    }

    /// Serialize to compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write JSON followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), JsonOutputError> {
        if pretty {
            serde_json::to_writer_pretty(&mut *writer, self)?;
        } else {
            serde_json::to_writer(&mut *writer, self)?;
        }
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON generation: {0}")]
    Io(#[from] std::io::Error),
}
