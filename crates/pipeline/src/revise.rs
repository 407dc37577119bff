//! Per-file revision: the shrink-or-correct state machine.

use crate::error::{ErrorKind, Result};
use crate::signature::ImageKind;
use exn::ResultExt;
use repix_tools::ToolsHandle;
use std::ffi::OsStr;
use std::path::PathBuf;
use tokio::fs;

/// Everything converges on lossless WebP; files already there are skipped
/// outright, which is also what makes a second run over converted output a
/// no-op.
const TARGET: ImageKind = ImageKind::Webp;

/// The outcome of (successfully) revising a single file.
///
/// Each variant carries the paths and sizes the logging layer wants.
/// Consumers can pattern-match to decide whether to log, count, or take
/// further action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Revision {
    /// Already in the target format; nothing to do.
    Skipped,
    /// The re-encoded copy was smaller and replaced the original at the
    /// derived `.webp` path.
    Rewritten { target: PathBuf, original_size: u64, converted_size: u64 },
    /// Re-encoding did not shrink the file, but its extension was lying
    /// about the signature and has been corrected in place. Content
    /// untouched.
    Relabelled { target: PathBuf },
    /// Re-encoding did not shrink the file and the extension already
    /// matches the signature (or the signature is unrecognisable); left
    /// untouched.
    Kept,
}

/// Revise one image file in place, terminal on the first applicable branch:
///
/// 1. Target-format files are skipped.
/// 2. The file is re-encoded through the external tool; tool failure fails
///    the task with no filesystem mutation.
/// 3. A result at least as large as the original is rejected — the only
///    revision left is renaming the file to match its sniffed signature.
///    A strictly smaller result is written to the `.webp`-derived path and
///    the original removed.
///
/// The replace in step 3 is write-then-delete, not atomic: a crash between
/// the two can leave both files on disk.
pub async fn revise_file(tools: ToolsHandle, path: PathBuf) -> Result<Revision> {
    if path.extension().and_then(OsStr::to_str) == Some(TARGET.extension()) {
        return Ok(Revision::Skipped);
    }

    let converted = tools.magick(&path).await.or_raise(|| ErrorKind::Convert(path.clone()))?;
    let original_size = fs::metadata(&path).await.map_err(ErrorKind::Io)?.len();

    if converted.len() as u64 >= original_size {
        let Some(kind) = ImageKind::sniff(&path).await.map_err(ErrorKind::Io)? else {
            return Ok(Revision::Kept);
        };
        if path.extension().and_then(OsStr::to_str) == Some(kind.extension()) {
            return Ok(Revision::Kept);
        }
        let target = path.with_extension(kind.extension());
        fs::rename(&path, &target).await.map_err(ErrorKind::Io)?;
        return Ok(Revision::Relabelled { target });
    }

    let target = path.with_extension(TARGET.extension());
    fs::write(&target, &converted).await.map_err(ErrorKind::Io)?;
    if target != path {
        fs::remove_file(&path).await.map_err(ErrorKind::Io)?;
    }
    Ok(Revision::Rewritten { target, original_size, converted_size: converted.len() as u64 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::toolchain;
    use std::ops::Deref;

    const JPEG_BYTES: &[u8] = b"\xFF\xD8\xFF\xE0 pretend this is fifty kilobytes of photo";
    const PNG_BYTES: &[u8] = b"\x89PNG\x0D\x0A\x1A\x0A pretend this is a png";

    /// A converter whose output is always 4 bytes — smaller than any
    /// fixture above.
    const SHRINKING: &str = "#!/bin/sh\nprintf tiny\n";
    /// A converter whose output is always larger than the fixtures.
    const BLOATING: &str = "#!/bin/sh\nhead -c 4096 /dev/zero\n";

    #[tokio::test]
    async fn test_smaller_result_replaces_the_original() {
        let temp_dir = tempfile::tempdir().unwrap();
        let tools = toolchain(temp_dir.path(), SHRINKING);
        let photo = temp_dir.path().join("photo.jpg");
        std::fs::write(&photo, JPEG_BYTES).unwrap();

        let revision = revise_file(tools, photo.clone()).await.unwrap();

        let target = temp_dir.path().join("photo.webp");
        assert_eq!(
            revision,
            Revision::Rewritten {
                target: target.clone(),
                original_size: JPEG_BYTES.len() as u64,
                converted_size: 4,
            },
        );
        assert!(!photo.exists());
        assert_eq!(std::fs::read(&target).unwrap(), b"tiny");
    }

    #[tokio::test]
    async fn test_larger_result_with_matching_signature_keeps_the_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let tools = toolchain(temp_dir.path(), BLOATING);
        let icon = temp_dir.path().join("icon.png");
        std::fs::write(&icon, PNG_BYTES).unwrap();

        let revision = revise_file(tools, icon.clone()).await.unwrap();

        assert_eq!(revision, Revision::Kept);
        assert_eq!(std::fs::read(&icon).unwrap(), PNG_BYTES);
    }

    #[tokio::test]
    async fn test_larger_result_with_lying_extension_relabels() {
        let temp_dir = tempfile::tempdir().unwrap();
        let tools = toolchain(temp_dir.path(), BLOATING);
        let mislabeled = temp_dir.path().join("mislabeled.jpg");
        std::fs::write(&mislabeled, PNG_BYTES).unwrap();

        let revision = revise_file(tools, mislabeled.clone()).await.unwrap();

        let corrected = temp_dir.path().join("mislabeled.png");
        assert_eq!(revision, Revision::Relabelled { target: corrected.clone() });
        assert!(!mislabeled.exists());
        assert_eq!(std::fs::read(&corrected).unwrap(), PNG_BYTES);
    }

    #[tokio::test]
    async fn test_larger_result_with_unidentifiable_signature_keeps_the_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let tools = toolchain(temp_dir.path(), BLOATING);
        let odd = temp_dir.path().join("odd.gif");
        std::fs::write(&odd, b"not actually an image").unwrap();

        let revision = revise_file(tools, odd.clone()).await.unwrap();

        assert_eq!(revision, Revision::Kept);
        assert!(odd.exists());
    }

    #[tokio::test]
    async fn test_target_format_is_skipped_without_invoking_the_tool() {
        let temp_dir = tempfile::tempdir().unwrap();
        // A converter that would blow up if it were ever called.
        let tools = toolchain(temp_dir.path(), "#!/bin/sh\nexit 1\n");
        let done = temp_dir.path().join("done.webp");
        std::fs::write(&done, b"RIFFxxxxWEBP").unwrap();

        // Twice, because idempotence is the point.
        assert_eq!(revise_file(tools.clone(), done.clone()).await.unwrap(), Revision::Skipped);
        assert_eq!(revise_file(tools, done.clone()).await.unwrap(), Revision::Skipped);
        assert_eq!(std::fs::read(&done).unwrap(), b"RIFFxxxxWEBP");
    }

    #[tokio::test]
    async fn test_tool_failure_is_tagged_and_mutates_nothing() {
        let temp_dir = tempfile::tempdir().unwrap();
        let tools = toolchain(temp_dir.path(), "#!/bin/sh\nexit 1\n");
        let photo = temp_dir.path().join("photo.jpg");
        std::fs::write(&photo, JPEG_BYTES).unwrap();

        let err = revise_file(tools, photo.clone()).await.unwrap_err();

        match err.deref() {
            ErrorKind::Convert(tagged) => assert_eq!(tagged, &photo),
            other => panic!("expected Convert, got {other}"),
        }
        assert_eq!(std::fs::read(&photo).unwrap(), JPEG_BYTES);
    }

    #[tokio::test]
    async fn test_equal_size_is_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        // Emits exactly the fixture's size, byte for byte.
        let script = format!("#!/bin/sh\nhead -c {} /dev/zero\n", PNG_BYTES.len());
        let tools = toolchain(temp_dir.path(), &script);
        let icon = temp_dir.path().join("icon.png");
        std::fs::write(&icon, PNG_BYTES).unwrap();

        assert_eq!(revise_file(tools, icon.clone()).await.unwrap(), Revision::Kept);
        assert_eq!(std::fs::read(&icon).unwrap(), PNG_BYTES);
    }

    #[tokio::test]
    async fn test_converter_diagnostics_do_not_leak_into_output() {
        let temp_dir = tempfile::tempdir().unwrap();
        let tools =
            toolchain(temp_dir.path(), "#!/bin/sh\nprintf 'resizing...' >&2\nprintf tiny\n");
        let photo = temp_dir.path().join("photo.gif");
        std::fs::write(&photo, JPEG_BYTES).unwrap();

        revise_file(tools, photo.clone()).await.unwrap();
        assert_eq!(std::fs::read(temp_dir.path().join("photo.webp")).unwrap(), b"tiny");
    }
}
