//! Archive Tool Adapter.
//!
//! Wraps the external archiver's `x` (extract) and `a` (create) operations
//! behind its exit-code convention: 0 is success, 1 is success with
//! non-fatal warnings (benign filename issues and the like), anything above
//! that is a failure worth the captured diagnostics.

use crate::error::{ErrorKind, Result};
use crate::Toolchain;
use std::ffi::OsString;
use std::path::Path;

impl Toolchain {
    /// Unpack all entries of `archive` into `destination` (created by the
    /// archiver if absent).
    pub async fn extract(&self, archive: &Path, destination: &Path) -> Result<()> {
        let mut dest_flag = OsString::from("-o");
        dest_flag.push(destination);
        let args: [OsString; 4] = ["x".into(), archive.into(), "-y".into(), dest_flag];
        self.seven_zip(args, None).await
    }

    /// Create a fresh archive at `archive` from everything under
    /// `content_root`, overwriting any existing file at that path.
    ///
    /// The child's working directory is scoped to `content_root` so the glob
    /// resolves there and entries carry relative paths; the compression
    /// level is "store", since contained images are already optimally
    /// encoded by the time this runs.
    pub async fn create(&self, archive: &Path, content_root: &Path) -> Result<()> {
        let args: [OsString; 5] =
            ["a".into(), archive.into(), "-y".into(), "-mx=0".into(), "*".into()];
        self.seven_zip(args, Some(content_root)).await
    }

    async fn seven_zip(
        &self,
        args: impl IntoIterator<Item = OsString>,
        workdir: Option<&Path>,
    ) -> Result<()> {
        let finished = crate::process::run(&self.archiver, args, workdir).await?;
        if finished.code > 1 {
            let mut output = String::from_utf8_lossy(&finished.stdout).into_owned();
            output.push_str(&String::from_utf8_lossy(&finished.stderr));
            exn::bail!(ErrorKind::Archive { code: finished.code, output });
        }
        if finished.code == 1 {
            tracing::warn!(
                diagnostics = %String::from_utf8_lossy(&finished.stderr),
                "archiver finished with warnings"
            );
        }
        Ok(())
    }
}
