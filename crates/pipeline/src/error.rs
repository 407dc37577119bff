//! Pipeline Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction. See `ERRORS.md` for design rationale.
//!
//! TODO: Definitely going to refactor this later once I've written a few
//!       more crates. Designing errors in Rust is **hard** and I don't want
//!       to resort to anyhow+thiserror just because I don't want to deal with it.

use derive_more::{Display, Error};
use std::io::Error as IoError;
use std::path::PathBuf;

/// A pipeline error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
/// Each is scoped: a `Resolve` loses one input argument, an `Archive` loses
/// one archive's task sequence, a `Convert` loses one file — siblings are
/// never affected.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// Input argument does not exist or cannot be classified; that argument
    /// is skipped and the remaining ones proceed.
    #[display("cannot resolve input: {}", _0.display())]
    Resolve(#[error(not(source))] PathBuf),
    /// An archive operation failed. During extraction this aborts the whole
    /// archive's task sequence; during repack it is logged and swallowed.
    #[display("archive operation failed: {}", _0.display())]
    Archive(#[error(not(source))] PathBuf),
    /// The external conversion failed for one file; the task is marked
    /// failed and everything else (including the archive's eventual repack)
    /// carries on.
    #[display("conversion failed: {}", _0.display())]
    Convert(#[error(not(source))] PathBuf),
    /// Underlying I/O error (rename/write/unlink during revision).
    #[display("I/O error: {_0}")]
    Io(IoError),
}
impl From<IoError> for ErrorKind {
    fn from(err: IoError) -> Self {
        Self::Io(err)
    }
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}
