//! Process exit codes and machine-readable error reports.

use serde::Serialize;

use crate::config::ConfigError;
use crate::duplicates::FinderError;

/// Exit codes for the sweeper binary.
///
/// - 0: Success (duplicates found and reported, or the action completed)
/// - 1: General error (I/O failure, unexpected failure)
/// - 2: No duplicates found
/// - 3: Partial success (action finished with per-file failures under `--keep-going`)
/// - 4: Invalid configuration (nothing was scanned)
/// - 130: Interrupted by user (Ctrl+C)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Duplicates were reported or the action completed.
    Success = 0,
    /// An unexpected error occurred.
    GeneralError = 1,
    /// The scan completed without finding duplicates.
    NoDuplicates = 2,
    /// Some files could not be removed or moved.
    PartialSuccess = 3,
    /// Options were rejected before scanning.
    InvalidConfig = 4,
    /// Scan was interrupted by user (Ctrl+C).
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
            Self::Success => "SW000",
            Self::GeneralError => "SW001",
            Self::NoDuplicates => "SW002",
            Self::PartialSuccess => "SW003",
            Self::InvalidConfig => "SW004",
            Self::Interrupted => "SW130",
        }
    }
}

/// Structured error information for `--json-errors`.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "SW001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message, including its causes
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
            message: format!("{err:#}"),
            interrupted: exit_code == ExitCode::Interrupted,
        }
    }
}

/// Pick the exit code for an error returned by [`run_app`](crate::run_app).
///
/// Anything rejected before scanning (options, roots) is a configuration
/// error; an interrupted scan is 130; everything else is a general error.
#[must_use]
pub fn exit_code_for(err: &anyhow::Error) -> ExitCode {
    if err.downcast_ref::<ConfigError>().is_some() {
        return ExitCode::InvalidConfig;
    }
    match err.downcast_ref::<FinderError>() {
        Some(FinderError::Interrupted) => ExitCode::Interrupted,
        Some(
            FinderError::InvalidConfig(_)
            | FinderError::PathNotFound(_)
            | FinderError::NotADirectory(_),
        ) => ExitCode::InvalidConfig,
        _ => ExitCode::GeneralError,
    }
}
