//! Image Conversion Adapter.
//!
//! One fixed pipeline: normalize contrast, shrink to fit within 1920×1080
//! (never upscale), encode as lossless WebP to standard output. The encoded
//! bytes come back as a buffer; the file on disk is not touched.

use crate::error::{ErrorKind, Result};
use crate::{RESIZE_BOUND, Toolchain};
use std::ffi::OsString;
use std::path::Path;

impl Toolchain {
    /// Re-encode `file` through the external conversion tool and return the
    /// full output buffer.
    ///
    /// # Errors
    /// Nonzero exit raises [`ErrorKind::Conversion`] tagged with the source
    /// file; whatever landed in the buffer before the failure is discarded.
    pub async fn magick(&self, file: &Path) -> Result<Vec<u8>> {
        let args: [OsString; 7] = [
            file.into(),
            "-normalize".into(),
            "-resize".into(),
            RESIZE_BOUND.into(),
            "-define".into(),
            "webp:lossless=true".into(),
            "webp:-".into(),
        ];
        let finished = crate::process::run(&self.converter, args, None).await?;
        // The tool chats on stderr while it works; surface it for the
        // operator without letting it touch the success/failure contract.
        if !finished.stderr.is_empty() {
            tracing::debug!(
                file = %file.display(),
                diagnostics = %String::from_utf8_lossy(&finished.stderr),
                "conversion tool diagnostics"
            );
        }
        if finished.code != 0 {
            exn::bail!(ErrorKind::Conversion(file.to_path_buf()));
        }
        Ok(finished.stdout)
    }
}
