//! Lazy traversal of input trees.

use crate::signature::ImageKind;
use async_stream::stream;
use futures::Stream;
use std::path::PathBuf;
use tokio::fs;

/// Recursively enumerate image files under `root`, lazily and depth-first.
///
/// A `root` that is itself a file yields at most itself (subject to the same
/// extension gate). Directory-ness is decided by *following* symlinks, so a
/// link to a directory descends; link cycles are not guarded against.
/// Traversal is read-only and never fails: unreadable directories and
/// entries are logged at `warn` and skipped.
pub fn walk(root: PathBuf) -> impl Stream<Item = PathBuf> + Send {
    stream! {
        let metadata = match fs::metadata(&root).await {
            Ok(metadata) => metadata,
            Err(error) => {
                tracing::warn!(path = %root.display(), %error, "cannot inspect walk root");
                return;
            },
        };
        if metadata.is_file() {
            if ImageKind::from_path(&root).is_some() {
                yield root;
            }
            return;
        }

        let mut stack = vec![root];
        'dirs: while let Some(current) = stack.pop() {
            let mut entries = match fs::read_dir(&current).await {
                Ok(entries) => entries,
                Err(error) => {
                    tracing::warn!(dir = %current.display(), %error, "skipping unreadable directory");
                    continue 'dirs;
                },
            };
            'entries: loop {
                let entry = match entries.next_entry().await {
                    Ok(Some(entry)) => entry,
                    Ok(None) => break 'entries,
                    Err(error) => {
                        tracing::warn!(dir = %current.display(), %error, "skipping unreadable entry");
                        continue 'entries;
                    },
                };
                let path = entry.path();
                // fs::metadata follows symlinks; dir-or-file is decided by
                // whatever the link resolves to.
                match fs::metadata(&path).await {
                    Ok(meta) if meta.is_dir() => stack.push(path),
                    Ok(meta) if meta.is_file() => {
                        if ImageKind::from_path(&path).is_some() {
                            yield path;
                        }
                    },
                    Ok(_) => {},
                    Err(error) => {
                        tracing::warn!(path = %path.display(), %error, "skipping unreadable entry");
                    },
                }
            }
        }
    }
}
