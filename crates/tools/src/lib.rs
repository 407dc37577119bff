//! External executable discovery and invocation.
//!
//! The actual pixel- and archive-crunching is done by two external tools
//! invoked as opaque subprocesses: an ImageMagick-style converter and a
//! 7-Zip-style archiver. This crate finds them once at startup and wraps
//! their argument contracts and exit-code conventions behind a [`Toolchain`].

pub mod error;
mod magick;
mod process;
mod seven_zip;

use crate::error::{ErrorKind, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Resize bound passed to the conversion tool: fit within 1920×1080,
/// shrinking only (the trailing `>` means "never upscale").
pub const RESIZE_BOUND: &str = "1920x1080>";

const CONVERTER_CANDIDATES: [&str; 2] = ["magick", "convert"];
const ARCHIVER_CANDIDATES: [&str; 3] = ["7zz", "7z", "7za"];

/// Shared handle to the discovered toolchain; cheap to clone into tasks.
pub type ToolsHandle = Arc<Toolchain>;

/// The pair of external executables everything else is built on.
#[derive(Debug)]
pub struct Toolchain {
    converter: PathBuf,
    archiver: PathBuf,
}
impl Toolchain {
    /// Locate both executables, probing `tools_dir` (a bundled tools
    /// directory, if the caller has one) before falling back to `$PATH`.
    ///
    /// # Errors
    /// [`ErrorKind::ConverterNotFound`] / [`ErrorKind::ArchiverNotFound`]
    /// when no candidate name resolves anywhere.
    pub fn discover(tools_dir: Option<&Path>) -> Result<Self> {
        let converter = Self::locate(tools_dir, &CONVERTER_CANDIDATES)
            .ok_or_else(|| exn::Exn::from(ErrorKind::ConverterNotFound))?;
        let archiver = Self::locate(tools_dir, &ARCHIVER_CANDIDATES)
            .ok_or_else(|| exn::Exn::from(ErrorKind::ArchiverNotFound))?;
        tracing::debug!(
            converter = %converter.display(),
            archiver = %archiver.display(),
            "external tools discovered"
        );
        Ok(Self { converter, archiver })
    }

    /// Build a toolchain from explicit executable paths, skipping discovery.
    pub fn with_executables(converter: impl Into<PathBuf>, archiver: impl Into<PathBuf>) -> Self {
        Self { converter: converter.into(), archiver: archiver.into() }
    }

    fn locate(tools_dir: Option<&Path>, candidates: &[&str]) -> Option<PathBuf> {
        if let Some(dir) = tools_dir {
            for name in candidates {
                let bundled = dir.join(name);
                if bundled.is_file() {
                    return Some(bundled);
                }
            }
            tracing::info!(dir = %dir.display(), "no bundled tool found; falling back to $PATH");
        }
        candidates.iter().find_map(|name| which::which(name).ok())
    }
}
