//! Image format identification.
//!
//! Files are discovered by extension but trusted only as far as their
//! leading bytes. [`ImageKind`] covers both sides: the case-sensitive
//! extension table used at discovery time, and the magic-byte table used to
//! catch extensions that lie about their contents.

use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncReadExt;

/// Length of the longest recognised signature (`RIFF....WEBP`). Sniffing
/// never reads more than this.
const SIGNATURE_LENGTH: usize = 12;

const JPEG_MAGIC: [u8; 3] = [0xFF, 0xD8, 0xFF];
const PNG_MAGIC: [u8; 4] = [0x89, 0x50, 0x4E, 0x47];
const GIF_MAGIC: [u8; 3] = *b"GIF";
const RIFF_MAGIC: [u8; 4] = *b"RIFF";
// The RIFF container tells us nothing by itself; WebP is the four bytes
// after the chunk size, at offset 8.
const WEBP_TAG: [u8; 4] = *b"WEBP";
const WEBP_TAG_OFFSET: usize = 8;

/// A recognised image format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ImageKind {
    /// JPEG (.jpg)
    Jpeg,
    /// PNG (.png)
    Png,
    /// GIF (.gif)
    Gif,
    /// WebP (.webp)
    Webp,
}

impl ImageKind {
    /// Detect a format from a file extension.
    ///
    /// The recognised set is exactly `jpg`, `png`, `gif`, `webp`,
    /// case-sensitive — `photo.JPG` is not an image as far as discovery is
    /// concerned.
    #[must_use]
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        match path.as_ref().extension().and_then(|ext| ext.to_str()) {
            Some("jpg") => Some(ImageKind::Jpeg),
            Some("png") => Some(ImageKind::Png),
            Some("gif") => Some(ImageKind::Gif),
            Some("webp") => Some(ImageKind::Webp),
            _ => None,
        }
    }

    /// Detect a format from leading magic bytes.
    ///
    /// Returns `None` if no signature matches or if the input is too short
    /// to detect any format.
    #[must_use]
    pub fn from_magic_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&JPEG_MAGIC) {
            return Some(ImageKind::Jpeg);
        }
        if bytes.starts_with(&PNG_MAGIC) {
            return Some(ImageKind::Png);
        }
        if bytes.starts_with(&GIF_MAGIC) {
            return Some(ImageKind::Gif);
        }
        if bytes.starts_with(&RIFF_MAGIC)
            && bytes.get(WEBP_TAG_OFFSET..WEBP_TAG_OFFSET + WEBP_TAG.len()) == Some(&WEBP_TAG[..])
        {
            return Some(ImageKind::Webp);
        }
        None
    }

    /// Returns the file extension for this format (dotless, ready for
    /// [`Path::with_extension`]).
    #[inline]
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self {
            ImageKind::Jpeg => "jpg",
            ImageKind::Png => "png",
            ImageKind::Gif => "gif",
            ImageKind::Webp => "webp",
        }
    }

    /// Identify a file by its leading bytes, ignoring its extension.
    ///
    /// Opens read-only, reads at most [`SIGNATURE_LENGTH`] bytes, and
    /// releases the handle before returning on every path.
    pub async fn sniff(path: &Path) -> std::io::Result<Option<Self>> {
        let file = File::open(path).await?;
        let mut head = Vec::with_capacity(SIGNATURE_LENGTH);
        file.take(SIGNATURE_LENGTH as u64).read_to_end(&mut head).await?;
        Ok(Self::from_magic_bytes(&head))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("photo.jpg", Some(ImageKind::Jpeg))]
    #[case("photo.png", Some(ImageKind::Png))]
    #[case("anim.gif", Some(ImageKind::Gif))]
    #[case("photo.webp", Some(ImageKind::Webp))]
    #[case("nested/dir/photo.jpg", Some(ImageKind::Jpeg))]
    // Case-sensitive, and no alias spellings.
    #[case("photo.JPG", None)]
    #[case("photo.jpeg", None)]
    #[case("photo.txt", None)]
    #[case("no_extension", None)]
    fn test_from_path(#[case] path: &str, #[case] expected: Option<ImageKind>) {
        assert_eq!(ImageKind::from_path(path), expected);
    }

    #[rstest]
    #[case(&[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'], Some(ImageKind::Jpeg))]
    #[case(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A], Some(ImageKind::Png))]
    #[case(b"GIF89a", Some(ImageKind::Gif))]
    #[case(b"GIF87a", Some(ImageKind::Gif))]
    #[case(b"RIFF\x24\x00\x00\x00WEBPVP8 ", Some(ImageKind::Webp))]
    // A RIFF container that is not WebP (WAVE audio, for instance).
    #[case(b"RIFF\x24\x00\x00\x00WAVEfmt ", None)]
    // Truncated RIFF header: too short to carry the WebP tag.
    #[case(b"RIFF\x24\x00", None)]
    #[case(b"", None)]
    #[case(b"plain text, honestly", None)]
    fn test_from_magic_bytes(#[case] bytes: &[u8], #[case] expected: Option<ImageKind>) {
        assert_eq!(ImageKind::from_magic_bytes(bytes), expected);
    }

    #[rstest]
    #[case(ImageKind::Jpeg, "jpg")]
    #[case(ImageKind::Png, "png")]
    #[case(ImageKind::Gif, "gif")]
    #[case(ImageKind::Webp, "webp")]
    fn test_extension(#[case] kind: ImageKind, #[case] expected: &str) {
        assert_eq!(kind.extension(), expected);
    }

    #[tokio::test]
    async fn test_sniff_reads_the_prefix() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("mislabeled.jpg");
        std::fs::write(&path, b"\x89PNG\x0D\x0A\x1A\x0A and then a lot of pixels").unwrap();
        assert_eq!(ImageKind::sniff(&path).await.unwrap(), Some(ImageKind::Png));
    }

    #[tokio::test]
    async fn test_sniff_short_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("stub.png");
        std::fs::write(&path, b"GI").unwrap();
        assert_eq!(ImageKind::sniff(&path).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_sniff_missing_file() {
        assert!(ImageKind::sniff(Path::new("/nonexistent/file.png")).await.is_err());
    }
}
