//! Converters: one producer of conversion tasks per input argument.

mod archive;
mod task;
mod tree;

pub use self::archive::ArchiveSource;
pub use self::task::Task;
pub use self::tree::TreeSource;
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use futures::Stream;
use futures::future::BoxFuture;
use repix_tools::ToolsHandle;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use tokio::fs;

/// A lazy sequence of conversion tasks. Production and consumption
/// interleave: the consumer can be driving one task before the producer has
/// walked to the next one.
pub type TaskStream<'a> = Pin<Box<dyn Stream<Item = Result<Task>> + Send + 'a>>;

/// A producer of conversion tasks for one input argument, dispatched once
/// at classification time.
#[derive(Debug)]
pub enum Source {
    /// A plain directory (or single file), converted in place.
    Tree(TreeSource),
    /// A zip archive, extracted to a scratch directory and repacked after
    /// all of its tasks settle.
    Archive(ArchiveSource),
}

impl Source {
    /// Classify one input argument by filesystem inspection: a file ending
    /// in `.zip` is an archive; anything else that exists is a plain tree
    /// (for non-directory arguments the walker's extension gate decides
    /// whether there is anything to do).
    ///
    /// # Errors
    /// [`ErrorKind::Resolve`] when the path does not exist or cannot be
    /// inspected; the caller skips the argument and moves on.
    pub async fn classify(tools: ToolsHandle, arg: &Path) -> Result<Self> {
        let path = std::path::absolute(arg).or_raise(|| ErrorKind::Resolve(arg.to_path_buf()))?;
        let metadata = fs::metadata(&path).await.or_raise(|| ErrorKind::Resolve(path.clone()))?;
        if metadata.is_file() && path.extension() == Some(OsStr::new("zip")) {
            Ok(Self::Archive(ArchiveSource::new(tools, path)))
        } else {
            Ok(Self::Tree(TreeSource::new(tools, path)))
        }
    }

    /// The resolved (absolute) path this converter covers.
    pub fn path(&self) -> &Path {
        match self {
            Self::Tree(tree) => tree.path(),
            Self::Archive(archive) => archive.path(),
        }
    }

    /// The converter's lazy task sequence, in traversal order.
    pub fn tasks(&mut self) -> TaskStream<'_> {
        match self {
            Self::Tree(tree) => tree.tasks(),
            Self::Archive(archive) => archive.tasks(),
        }
    }

    /// For archive converters that actually extracted something: the
    /// deferred repack-and-cleanup future. `None` for plain trees and for
    /// archives whose extraction failed.
    pub fn into_repack(self) -> Option<BoxFuture<'static, PathBuf>> {
        match self {
            Self::Tree(_) => None,
            Self::Archive(archive) => archive.into_repack(),
        }
    }
}
