//! External command execution.
//!
//! Builder API around `tokio::process` with a hard wall-clock timeout. A
//! timed-out child and everything it started are killed, and the child is
//! reaped before `run` returns.
//!
//! # Examples
//!
//! ```ignore
//! use crate::utils::exec::Cmd;
//!
//! let output = Cmd::new("pdflatex")
//!     .args(["-interaction=nonstopmode", "main.tex"])
//!     .cwd(root)
//!     .timeout(Duration::from_secs(30))
//!     .run()
//!     .await?;
//! ```

use std::{
    ffi::{OsStr, OsString},
    path::{Path, PathBuf},
    process::{ExitStatus, Stdio},
    time::Duration,
};

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::task::{AbortHandle, JoinHandle};

/// Default limit when the caller does not set one.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{program}` timed out after {}s", .after.as_secs())]
    Timeout { program: String, after: Duration },

    #[error("failed while waiting for `{program}`: {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Captured result of a finished process.
#[derive(Debug)]
pub struct CmdOutput {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CmdOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Diagnostic text: stderr if it has content, else stdout.
    pub fn diagnostic(&self) -> String {
        let stderr = String::from_utf8_lossy(&self.stderr);
        if !stderr.trim().is_empty() {
            return stderr.into_owned();
        }
        String::from_utf8_lossy(&self.stdout).into_owned()
    }
}

/// Command builder for external process execution.
#[derive(Debug)]
pub struct Cmd {
    program: OsString,
    args: Vec<OsString>,
    cwd: Option<PathBuf>,
    timeout: Duration,
}

impl Cmd {
    pub fn new<S: AsRef<OsStr>>(program: S) -> Self {
        Self {
            program: program.as_ref().to_owned(),
            args: Vec::new(),
            cwd: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Create from a command array (e.g., `["latexmk", "-pdf", "main.tex"]`).
    ///
    /// Returns `None` for an empty slice.
    pub fn from_slice<S: AsRef<OsStr>>(cmd: &[S]) -> Option<Self> {
        let (program, args) = cmd.split_first()?;
        Some(Self::new(program).args(args))
    }

    pub fn arg<S: AsRef<OsStr>>(mut self, arg: S) -> Self {
        let arg = arg.as_ref();
        if !arg.is_empty() {
            self.args.push(arg.to_owned());
        }
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        for arg in args {
            self = self.arg(arg);
        }
        self
    }

    pub fn cwd<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.cwd = Some(dir.as_ref().to_owned());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn program_name(&self) -> String {
        self.program.to_string_lossy().to_string()
    }

    /// Run to completion or until the timeout fires.
    ///
    /// The limit covers the exit and the draining of both pipes, so a
    /// background grandchild holding the pipes open cannot stall the caller.
    /// On unix the child leads its own process group and the whole group is
    /// killed on timeout. A non-zero exit is not an error here; callers
    /// inspect `status`.
    pub async fn run(self) -> Result<CmdOutput, ExecError> {
        let program = self.program_name();

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        cmd.process_group(0);
        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }

        let mut child = cmd.spawn().map_err(|source| ExecError::Spawn {
            program: program.clone(),
            source,
        })?;
        // read before waiting: `id()` is gone once the child is reaped
        let group = child.id();

        // Drain both pipes concurrently so a chatty compiler never blocks
        // on a full pipe buffer.
        let stdout_task = child.stdout.take().map(|out| tokio::spawn(drain(out)));
        let stderr_task = child.stderr.take().map(|err| tokio::spawn(drain(err)));
        let drains: Vec<AbortHandle> = [&stdout_task, &stderr_task]
            .into_iter()
            .flatten()
            .map(JoinHandle::abort_handle)
            .collect();

        let collect = async {
            let status = child.wait().await.map_err(|source| ExecError::Wait {
                program: program.clone(),
                source,
            })?;
            let stdout = join_drain(stdout_task).await;
            let stderr = join_drain(stderr_task).await;
            Ok::<_, ExecError>(CmdOutput {
                status,
                stdout,
                stderr,
            })
        };

        let finished = tokio::time::timeout(self.timeout, collect).await;
        match finished {
            Ok(result) => result,
            Err(_) => {
                crate::debug!("exec"; "killing `{}` after {:?}", program, self.timeout);
                #[cfg(unix)]
                kill_group(group);
                // kill() also waits for the exit, so the child is reaped here
                let _ = child.kill().await;
                for drain in drains {
                    drain.abort();
                }
                Err(ExecError::Timeout {
                    program,
                    after: self.timeout,
                })
            }
        }
    }
}

async fn drain<R: AsyncRead + Unpin>(mut pipe: R) -> Vec<u8> {
    let mut buf = Vec::new();
    let _ = pipe.read_to_end(&mut buf).await;
    buf
}

async fn join_drain(task: Option<JoinHandle<Vec<u8>>>) -> Vec<u8> {
    match task {
        Some(task) => task.await.unwrap_or_default(),
        None => Vec::new(),
    }
}

/// SIGKILL every process in the group led by the spawned child.
#[cfg(unix)]
fn kill_group(group: Option<u32>) {
    let Some(pgid) = group.and_then(|id| libc::pid_t::try_from(id).ok()) else {
        return;
    };
    // SAFETY: killpg only sends a signal; the group was created for this
    // child at spawn and lives as long as any of its members.
    unsafe {
        libc::killpg(pgid, libc::SIGKILL);
    }
}

/// Locate a program on `PATH`.
pub fn find_program(program: &str) -> Option<PathBuf> {
    which::which(program).ok()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn test_run_captures_output() {
        let output = Cmd::new("sh")
            .args(["-c", "echo out; echo err >&2"])
            .run()
            .await
            .unwrap();
        assert!(output.success());
        assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "out");
        assert_eq!(output.diagnostic().trim(), "err");
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_not_an_error() {
        let output = Cmd::from_slice(&["sh", "-c", "echo broken; exit 3"])
            .unwrap()
            .run()
            .await
            .unwrap();
        assert!(!output.success());
        assert_eq!(output.status.code(), Some(3));
        // empty stderr falls back to stdout
        assert_eq!(output.diagnostic().trim(), "broken");
    }

    #[tokio::test]
    async fn test_timeout_kills_child() {
        let start = Instant::now();
        let result = Cmd::new("sleep")
            .arg("10")
            .timeout(Duration::from_millis(200))
            .run()
            .await;
        assert!(matches!(result, Err(ExecError::Timeout { .. })));
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_timeout_covers_grandchild_holding_pipes() {
        let start = Instant::now();
        let result = Cmd::new("sh")
            .args(["-c", "sleep 6 & echo started"])
            .timeout(Duration::from_millis(500))
            .run()
            .await;
        assert!(matches!(result, Err(ExecError::Timeout { .. })));
        assert!(start.elapsed() < Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_timeout_kills_process_group() {
        let temp = tempfile::TempDir::new().unwrap();
        let marker = temp.path().join("alive");
        let script = format!("(sleep 1; echo alive > '{}') & wait", marker.display());

        let result = Cmd::new("sh")
            .args(["-c", script.as_str()])
            .timeout(Duration::from_millis(300))
            .run()
            .await;
        assert!(matches!(result, Err(ExecError::Timeout { .. })));

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(!marker.exists());
    }

    #[tokio::test]
    async fn test_missing_program() {
        let result = Cmd::new("texpane-no-such-program-xyz").run().await;
        let err = result.unwrap_err();
        assert!(matches!(err, ExecError::Spawn { .. }));
        assert!(err.to_string().contains("texpane-no-such-program-xyz"));
    }

    #[test]
    fn test_from_empty_slice() {
        let empty: [&str; 0] = [];
        assert!(Cmd::from_slice(&empty).is_none());
    }

    #[test]
    fn test_find_program() {
        assert!(find_program("sh").is_some());
        assert!(find_program("texpane-no-such-program-xyz").is_none());
    }
}
