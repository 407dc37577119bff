//! The scheduler: fans input arguments out into a bounded stream of
//! conversion work.

use crate::MAX_IN_FLIGHT;
use crate::error::{Error, Result};
use crate::revise::Revision;
use crate::source::Source;
use async_stream::stream;
use futures::future::BoxFuture;
use futures::stream::FuturesUnordered;
use futures::{Stream, StreamExt};
use repix_tools::ToolsHandle;
use std::path::PathBuf;

/// Progress events emitted by [`convert`] as it works through the input
/// arguments.
///
/// Arguments are taken up strictly in the order given, and each argument's
/// tasks start in traversal order, but settlements are unordered — whichever
/// subprocess finishes first settles first. [`Repacked`](Self::Repacked)
/// events only ever arrive after every task of that archive has settled.
/// The stream ending is the overall completion signal: every task and every
/// repack has settled by then.
pub enum ConvertEvent {
    /// An input argument resolved; its tasks are about to be scheduled.
    Argument { path: PathBuf },
    /// An input argument could not be processed at all (unresolvable, or
    /// its archive failed to extract). Siblings are unaffected.
    ArgumentSkipped { path: PathBuf, error: Error },
    /// A conversion task was admitted; its subprocess is now in flight.
    TaskStarted { path: PathBuf },
    /// A conversion task settled, one way or the other.
    TaskSettled { path: PathBuf, outcome: Result<Revision> },
    /// A zip input finished its deferred repack-and-cleanup.
    Repacked { archive: PathBuf },
}

/// Drive every input argument to completion, never letting more than
/// [`MAX_IN_FLIGHT`] conversions run at once.
///
/// Tasks are pulled lazily from each argument's converter; whenever the
/// in-flight set is full, the scheduler waits for the earliest settlement
/// before asking for the next task. Archive repacks are collected
/// separately and drained at the very end, so the stream cannot finish
/// while any repack is still running.
pub fn convert(tools: ToolsHandle, args: Vec<PathBuf>) -> impl Stream<Item = ConvertEvent> + Send {
    stream! {
        let mut in_flight: FuturesUnordered<BoxFuture<'static, (PathBuf, Result<Revision>)>> =
            FuturesUnordered::new();
        let mut repacks: FuturesUnordered<BoxFuture<'static, PathBuf>> = FuturesUnordered::new();

        for arg in args {
            let mut source = match Source::classify(tools.clone(), &arg).await {
                Ok(source) => source,
                Err(error) => {
                    yield ConvertEvent::ArgumentSkipped { path: arg, error };
                    continue;
                },
            };
            let arg_path = source.path().to_path_buf();
            yield ConvertEvent::Argument { path: arg_path.clone() };
            {
                let mut tasks = source.tasks();
                while let Some(next) = tasks.next().await {
                    let task = match next {
                        Ok(task) => task,
                        Err(error) => {
                            // Only extraction produces error items, and it
                            // aborts the whole argument: the sequence ends
                            // here with nothing converted.
                            yield ConvertEvent::ArgumentSkipped { path: arg_path.clone(), error };
                            break;
                        },
                    };
                    if in_flight.len() >= MAX_IN_FLIGHT {
                        if let Some((path, outcome)) = in_flight.next().await {
                            yield ConvertEvent::TaskSettled { path, outcome };
                        }
                    }
                    yield ConvertEvent::TaskStarted { path: task.path.clone() };
                    in_flight.push(task.into_settlement());
                }
            }
            if let Some(repack) = source.into_repack() {
                repacks.push(repack);
            }
        }

        while let Some((path, outcome)) = in_flight.next().await {
            yield ConvertEvent::TaskSettled { path, outcome };
        }
        // Every task has settled, so each repack's completion group is
        // already drained; these futures now just do the archive tail work.
        while let Some(archive) = repacks.next().await {
            yield ConvertEvent::Repacked { archive };
        }
    }
}
