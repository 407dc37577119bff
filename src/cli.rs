//! Command-line surface.

use clap::Parser;
use std::path::PathBuf;

/// Batch image recompression with archive-aware scheduling.
///
/// Every image under the given inputs is re-encoded as lossless WebP fitting
/// within 1920x1080; the original is replaced only when that actually saves
/// bytes, and a file that will not shrink at most has a lying extension
/// corrected. Zip archives are unpacked, revised, and repacked in place.
#[derive(Debug, Parser)]
#[command(name = "repix", version)]
pub struct Cli {
    /// Images, directories, or `.zip` archives to revise.
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Directory holding bundled tool executables, probed before `$PATH`.
    #[arg(long, value_name = "DIR")]
    pub tools_dir: Option<PathBuf>,
}
