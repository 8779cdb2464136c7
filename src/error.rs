//! Structured error handling and exit codes.

use serde::Serialize;

/// Exit codes for the filedup binary.
///
/// - 0: Success (completed normally, with or without duplicates)
/// - 1: General error (unexpected failure, bad config)
/// - 2: Invalid input (a root does not exist or is not a directory)
/// - 3: Partial success (completed, but some files were skipped)
/// - 130: Interrupted by user (Ctrl+C)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Success: Scan completed.
    Success = 0,
    /// General error: An unexpected error occurred.
    GeneralError = 1,
    /// Invalid input: A root argument was rejected.
    InvalidInput = 2,
    /// Partial success: Scan completed but some files could not be read.
    PartialSuccess = 3,
    /// Interrupted: Scan was interrupted by user (Ctrl+C).
    Interrupted = 130,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "FD000",
            Self::GeneralError => "FD001",
            Self::InvalidInput => "FD002",
            Self::PartialSuccess => "FD003",
            Self::Interrupted => "FD130",
        }
    }
}

/// A root argument that failed validation.
#[derive(thiserror::Error, Debug)]
pub enum InputError {
    /// The path does not exist.
    #[error("{0}: no such file or directory")]
    NotFound(std::path::PathBuf),
    /// The path exists but is not a directory.
    #[error("{0}: not a directory")]
    NotADirectory(std::path::PathBuf),
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "FD001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message
    pub message: String,
    /// Whether the operation was interrupted
    pub interrupted: bool,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{:#}", err),
            interrupted: exit_code == ExitCode::Interrupted,
        }
    }
}

/// Pick the exit code for an error that escaped `run_app`.
#[must_use]
pub fn exit_code_for(err: &anyhow::Error) -> ExitCode {
    if err
        .downcast_ref::<crate::duplicates::FinderError>()
        .is_some_and(|e| matches!(e, crate::duplicates::FinderError::Interrupted))
    {
        ExitCode::Interrupted
    } else if err.downcast_ref::<InputError>().is_some() {
        ExitCode::InvalidInput
    } else {
        ExitCode::GeneralError
    }
}
