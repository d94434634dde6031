use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Failure to derive an asset identifier from a file name
#[derive(Debug, Error)]
pub enum IdentifierError {
    #[error("path has no file name: {0}")]
    MissingFileName(String),
    #[error("no UUID found in file name '{0}'")]
    NoIdentifier(String),
}

/// Failure reported by a fingerprint provider for one audio file
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("audio file not found: {0}")]
    FileNotFound(String),
    #[error("fingerprinting tool '{0}' not found")]
    ToolNotFound(String),
    #[error("fingerprinting tool failed ({status}): {stderr}")]
    ToolFailed { status: String, stderr: String },
    #[error("fingerprinting timed out after {0:?}")]
    Timeout(Duration),
    #[error("fingerprinting output has no {0} field")]
    MissingField(&'static str),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Errors raised by the extractor and the collator.
///
/// `InputNotFound`, `InputUnreadable` and a `WriteFailure` on the run's
/// output location are fatal. Everything else is reported per item.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("input not found: {}", .0.display())]
    InputNotFound(PathBuf),
    #[error("cannot read input {}: {reason}", .path.display())]
    InputUnreadable { path: PathBuf, reason: String },
    #[error("failed to fingerprint {}: {source}", .path.display())]
    DecodeFailure {
        path: PathBuf,
        #[source]
        source: DecodeError,
    },
    #[error("failed to parse {}: {reason}", .path.display())]
    ParseFailure { path: PathBuf, reason: String },
    #[error("failed to write {}: {reason}", .path.display())]
    WriteFailure { path: PathBuf, reason: String },
    #[error("cannot derive identifier for {}: {source}", .path.display())]
    InvalidIdentifier {
        path: PathBuf,
        #[source]
        source: IdentifierError,
    },
    #[error("identifier {uuid} of {} was already produced by {}", .path.display(), .first.display())]
    DuplicateIdentifier {
        path: PathBuf,
        uuid: Uuid,
        first: PathBuf,
    },
}

impl BatchError {
    pub fn write_failure(path: &Path, err: impl std::fmt::Display) -> Self {
        BatchError::WriteFailure {
            path: path.to_path_buf(),
            reason: format!("{:#}", err),
        }
    }

    /// The input or output path the error is about
    pub fn path(&self) -> &Path {
        match self {
            BatchError::InputNotFound(path) => path,
            BatchError::InputUnreadable { path, .. }
            | BatchError::DecodeFailure { path, .. }
            | BatchError::ParseFailure { path, .. }
            | BatchError::WriteFailure { path, .. }
            | BatchError::InvalidIdentifier { path, .. }
            | BatchError::DuplicateIdentifier { path, .. } => path,
        }
    }

    /// Stable name of the error kind, used in run summaries
    pub fn kind(&self) -> &'static str {
        match self {
            BatchError::InputNotFound(_) => "InputNotFound",
            BatchError::InputUnreadable { .. } => "InputUnreadable",
            BatchError::DecodeFailure { .. } => "DecodeFailure",
            BatchError::ParseFailure { .. } => "ParseFailure",
            BatchError::WriteFailure { .. } => "WriteFailure",
            BatchError::InvalidIdentifier { .. } => "InvalidIdentifier",
            BatchError::DuplicateIdentifier { .. } => "DuplicateIdentifier",
        }
    }
}

/// One skipped item in a batch run, with enough context to retry it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemFailure {
    pub path: String,
    pub kind: &'static str,
    pub error: String,
}

impl ItemFailure {
    pub fn new(path: &Path, err: &BatchError) -> Self {
        Self {
            path: path.display().to_string(),
            kind: err.kind(),
            error: err.to_string(),
        }
    }
}
