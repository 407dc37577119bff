//! Subprocess plumbing shared by the tool adapters.

use crate::error::{ErrorKind, Result};
use std::ffi::OsStr;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

/// Collected output of a finished subprocess.
///
/// `code` is the real exit code; signal-terminated processes never produce
/// one and are reported as [`ErrorKind::Aborted`] instead, so callers can
/// apply their own exit-code conventions without a `None` case.
#[derive(Debug)]
pub(crate) struct Finished {
    pub(crate) code: i32,
    pub(crate) stdout: Vec<u8>,
    pub(crate) stderr: Vec<u8>,
}

/// Spawn `program` with `args`, wait for it to exit, and collect both output
/// streams. `workdir` sets the child's working directory explicitly at spawn
/// time — nothing here ever touches the parent's working directory.
pub(crate) async fn run(
    program: &Path,
    args: impl IntoIterator<Item = impl AsRef<OsStr>>,
    workdir: Option<&Path>,
) -> Result<Finished> {
    let mut command = Command::new(program);
    command.args(args).stdin(Stdio::null()).stdout(Stdio::piped()).stderr(Stdio::piped());
    if let Some(dir) = workdir {
        command.current_dir(dir);
    }
    let output = command.output().await.map_err(ErrorKind::Io)?;
    match output.status.code() {
        Some(code) => Ok(Finished { code, stdout: output.stdout, stderr: output.stderr }),
        None => exn::bail!(ErrorKind::Aborted(program.display().to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::ops::Deref;

    #[rstest]
    #[case("exit 0", 0)]
    #[case("exit 1", 1)]
    #[case("exit 3", 3)]
    #[tokio::test]
    async fn test_exit_codes(#[case] script: &str, #[case] expected: i32) {
        let finished = run(Path::new("sh"), ["-c", script], None).await.unwrap();
        assert_eq!(finished.code, expected);
    }

    #[tokio::test]
    async fn test_collects_both_streams() {
        let finished =
            run(Path::new("sh"), ["-c", "printf out; printf err >&2"], None).await.unwrap();
        assert_eq!(finished.stdout, b"out");
        assert_eq!(finished.stderr, b"err");
    }

    #[tokio::test]
    async fn test_workdir_is_per_spawn() {
        let temp_dir = tempfile::tempdir().unwrap();
        let finished =
            run(Path::new("pwd"), std::iter::empty::<&str>(), Some(temp_dir.path())).await.unwrap();
        let reported = String::from_utf8(finished.stdout).unwrap();
        let canonical = temp_dir.path().canonicalize().unwrap();
        assert_eq!(Path::new(reported.trim()), canonical);
    }

    #[tokio::test]
    async fn test_signal_termination_is_aborted() {
        let err = run(Path::new("sh"), ["-c", "kill -KILL $$"], None).await.unwrap_err();
        assert!(matches!(err.deref(), ErrorKind::Aborted(_)));
    }

    #[tokio::test]
    async fn test_missing_program_is_io() {
        let err =
            run(Path::new("/nonexistent/program"), std::iter::empty::<&str>(), None).await.unwrap_err();
        assert!(matches!(err.deref(), ErrorKind::Io(_)));
    }
}
