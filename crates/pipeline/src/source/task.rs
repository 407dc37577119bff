//! The unit the scheduler tracks: one file, one pending revision.

use crate::error::Result;
use crate::revise::{self, Revision};
use futures::future::BoxFuture;
use repix_tools::ToolsHandle;
use std::path::PathBuf;
use tokio::sync::mpsc::UnboundedSender;

/// One file's pending revision, coupled with the path it was discovered at.
///
/// The future settles exactly once — with the [`Revision`] outcome or a
/// tagged error — and a task is never re-used. Tasks are inert until the
/// scheduler admits them, which is how the concurrency cap stays honest.
pub struct Task {
    /// The file this task will revise.
    pub path: PathBuf,
    future: BoxFuture<'static, Result<Revision>>,
}

impl Task {
    pub(crate) fn new(tools: ToolsHandle, path: PathBuf) -> Self {
        let future = Box::pin(revise::revise_file(tools, path.clone()));
        Self { path, future }
    }

    /// Attach a completion-group guard: the sender clone is dropped when
    /// the task settles (or when an unadmitted task is thrown away), so the
    /// group's receiver closes exactly when every member is accounted for.
    pub(crate) fn with_guard(self, guard: UnboundedSender<()>) -> Self {
        let Self { path, future } = self;
        Self {
            path,
            future: Box::pin(async move {
                let outcome = future.await;
                drop(guard);
                outcome
            }),
        }
    }

    /// Turn the task into the settlement future the scheduler drives: it
    /// resolves with the discovery path alongside the outcome, whichever
    /// way the revision went.
    pub(crate) fn into_settlement(self) -> BoxFuture<'static, (PathBuf, Result<Revision>)> {
        let Self { path, future } = self;
        Box::pin(async move {
            let outcome = future.await;
            (path, outcome)
        })
    }
}
