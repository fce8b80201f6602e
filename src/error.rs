//! Errors raised while bringing a listing file into memory.
//!
//! Only source-level failures are errors.  Per-value parse failures and
//! missing columns inside the pipeline are absorbed there.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataError {
    /// The source file could not be opened or read through.
    #[error("source {path} is unavailable: {reason}")]
    SourceUnavailable { path: PathBuf, reason: String },

    /// None of the expected listing columns exist in the source.
    #[error("source {path} has none of the expected columns (found: {found:?})")]
    SchemaMismatch { path: PathBuf, found: Vec<String> },

    /// The file extension maps to no known reader.
    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),
}

impl DataError {
    pub(crate) fn unavailable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        DataError::SourceUnavailable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DataError>;
