//! Error taxonomy for the update workflow.
//!
//! Only conditions the workflow has to tell apart get a dedicated type.
//! Everything else travels as `anyhow::Error` with context attached.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while parsing or aggregating versions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    /// The label does not have the `N.N[.N][suffix]` shape.
    #[error("Invalid version format: {0:?}")]
    InvalidVersionFormat(String),

    /// `max` was asked for the greatest of zero versions.
    #[error("Cannot take the maximum of an empty version set")]
    EmptySet,
}

/// A package manager, archive tool or transfer tool exited unsuccessfully.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{tool} failed with {}", describe_code(.code))]
pub struct ExternalToolFailure {
    pub tool: String,
    /// `None` when the process was terminated by a signal.
    pub code: Option<i32>,
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

/// Outcome of a failed download attempt.
///
/// `ChecksumMismatch` is the only recoverable failure: the caller may delete
/// the corrupt file and try again.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("Checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch {
        expected: String,
        actual: String,
        /// The corrupt file left on disk.
        path: PathBuf,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DownloadError {
    pub fn is_recoverable(&self) -> bool {
        matches!(self, DownloadError::ChecksumMismatch { .. })
    }
}
