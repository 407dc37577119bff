//! Zip-backed converter: extract, convert in a scratch directory, repack.

use crate::error::{ErrorKind, Result};
use crate::source::{TaskStream, tree::TreeSource};
use async_stream::stream;
use exn::ResultExt;
use futures::future::BoxFuture;
use repix_tools::ToolsHandle;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Converter for a `.zip` input.
///
/// Owns the whole archive lifecycle: extraction into a scratch directory
/// (a sibling of the archive, named after it minus the `.zip` suffix),
/// conversion of the extracted tree, and — once every task it handed out
/// has settled — deleting the original, repacking from the scratch
/// contents, and removing the scratch tree.
#[derive(Debug)]
pub struct ArchiveSource {
    tools: ToolsHandle,
    archive: PathBuf,
    scratch: PathBuf,
    guard: UnboundedSender<()>,
    settled: UnboundedReceiver<()>,
    extracted: bool,
}

impl ArchiveSource {
    pub(crate) fn new(tools: ToolsHandle, archive: PathBuf) -> Self {
        let scratch = archive.with_extension("");
        // The channel is never written to: every task holds a sender clone
        // that it drops on settlement, and `recv` returning `None` is the
        // one-shot "all of this archive's work is done" signal.
        let (guard, settled) = mpsc::unbounded_channel();
        Self { tools, archive, scratch, guard, settled, extracted: false }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.archive
    }

    /// Extraction happens on first pull; if it fails, the single yielded
    /// error is the whole sequence — no tasks, and the archive is left
    /// exactly as it was.
    pub(crate) fn tasks(&mut self) -> TaskStream<'_> {
        Box::pin(stream! {
            if let Err(e) = self.tools.extract(&self.archive, &self.scratch).await {
                yield Err(e).or_raise(|| ErrorKind::Archive(self.archive.clone()));
                return;
            }
            self.extracted = true;
            let mut nested = TreeSource::new(self.tools.clone(), self.scratch.clone());
            let inner = nested.tasks();
            for await task in inner {
                yield task.map(|t| t.with_guard(self.guard.clone()));
            }
        })
    }

    /// The deferred tail of the lifecycle, to be driven once the caller has
    /// drained [`tasks`](Self::tasks): waits for every handed-out task to
    /// settle, then repacks and cleans up. Failures in there are logged and
    /// swallowed — the future always resolves, so the scheduler can finish.
    ///
    /// Returns `None` when extraction never succeeded: there is nothing to
    /// repack and the original archive must survive.
    pub(crate) fn into_repack(self) -> Option<BoxFuture<'static, PathBuf>> {
        if !self.extracted {
            return None;
        }
        let Self { tools, archive, scratch, guard, mut settled, .. } = self;
        Some(Box::pin(async move {
            drop(guard);
            while settled.recv().await.is_some() {}
            if let Err(error) = repack(&tools, &archive, &scratch).await {
                tracing::warn!(archive = %archive.display(), %error, "archive repack failed");
            }
            archive
        }))
    }
}

/// Delete the original archive, re-create it from the scratch contents
/// (working directory scoped to the scratch dir, so entries carry relative
/// paths), then delete the scratch tree.
async fn repack(tools: &ToolsHandle, archive: &Path, scratch: &Path) -> Result<()> {
    fs::remove_file(archive).await.map_err(ErrorKind::Io)?;
    tools.create(archive, scratch).await.or_raise(|| ErrorKind::Archive(archive.to_path_buf()))?;
    fs::remove_dir_all(scratch).await.map_err(ErrorKind::Io)?;
    Ok(())
}
