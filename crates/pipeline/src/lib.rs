//! The conversion pipeline: discovery, per-file revision, and the bounded
//! scheduler that drives everything.
//!
//! The CLI hands [`convert`] a list of input arguments and consumes the
//! resulting event stream; everything in between — walking trees, sniffing
//! signatures, invoking the external tools, extracting and repacking
//! archives — happens lazily behind that stream.

pub mod convert;
pub mod error;
mod revise;
mod signature;
mod source;
mod walk;

pub use crate::convert::{ConvertEvent, convert};
pub use crate::revise::{Revision, revise_file};
pub use crate::signature::ImageKind;
pub use crate::source::{Source, Task};
pub use crate::walk::walk;

/// Global bound on simultaneously outstanding conversion subprocesses,
/// across all input arguments. Archive bookkeeping is not counted.
pub const MAX_IN_FLIGHT: usize = 4;
