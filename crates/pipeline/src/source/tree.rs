//! Plain-directory converter: one task per walked image, nothing else.

use crate::source::{Task, TaskStream};
use crate::walk::walk;
use futures::StreamExt;
use repix_tools::ToolsHandle;
use std::path::{Path, PathBuf};

/// Converter for a plain directory tree (or a single file).
///
/// The source is read-only from this converter's perspective; the only
/// mutations are the in-place ones performed by individual revisions.
#[derive(Debug)]
pub struct TreeSource {
    tools: ToolsHandle,
    root: PathBuf,
}

impl TreeSource {
    pub(crate) fn new(tools: ToolsHandle, root: PathBuf) -> Self {
        Self { tools, root }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.root
    }

    pub(crate) fn tasks(&mut self) -> TaskStream<'_> {
        let tools = self.tools.clone();
        Box::pin(walk(self.root.clone()).map(move |path| Ok(Task::new(tools.clone(), path))))
    }
}
