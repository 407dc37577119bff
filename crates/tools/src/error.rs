//! Tool Error Types
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

/// A tool error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for tool operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// No image conversion executable detected on the system.
    #[display("image conversion tool not found (tried: magick, convert)")]
    ConverterNotFound,
    /// No archiver executable detected on the system.
    #[display("archive tool not found (tried: 7zz, 7z, 7za)")]
    ArchiverNotFound,
    /// The subprocess never produced an exit code (killed by a signal or
    /// crashed); whatever it wrote before dying is not to be trusted.
    #[display("{_0} terminated abnormally")]
    Aborted(#[error(not(source))] String),
    /// The archiver exited with a code above its success-with-warnings
    /// threshold. Carries the captured diagnostics for the operator.
    #[display("archiver exited with code {code}")]
    Archive { code: i32, output: String },
    /// The conversion tool failed for one source file. The partial output
    /// buffer is unusable.
    #[display("conversion failed: {}", _0.display())]
    Conversion(#[error(not(source))] PathBuf),
    /// Underlying I/O error (most likely the spawn itself).
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
