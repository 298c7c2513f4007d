//! Running the external compiler.
//!
//! The [`Executor`] trait is the seam between the stage and the operating
//! system. [`SystemExecutor`] spawns a real process; tests pass a closure
//! that inspects the invocation and fakes the compiler's side effects.

use std::{
    io::{self, Read},
    process::{Child, Command, Stdio},
    thread,
};

use serde::Serialize;
use thiserror::Error;

/// A fully marshaled compiler call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessInvocation {
    pub executable: String,
    pub args: Vec<String>,
    /// Ceiling for each of stdout and stderr.
    pub capture_limit_bytes: u64,
}

impl ProcessInvocation {
    /// Render the call as a single shell-like line (for display only).
    pub fn command_line(&self) -> String {
        std::iter::once(self.executable.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Captured result of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code; `None` when the process was killed by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    /// A successful run with no output.
    pub fn clean() -> Self {
        Self {
            code: Some(0),
            ..Self::default()
        }
    }

    /// A successful run that printed diagnostics.
    pub fn with_stderr(stderr: impl Into<String>) -> Self {
        Self {
            code: Some(0),
            stderr: stderr.into(),
            ..Self::default()
        }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Failure to run the compiler at all.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to spawn '{executable}'")]
    Spawn {
        executable: String,
        #[source]
        source: io::Error,
    },

    #[error("{stream} exceeded the capture limit of {limit} bytes")]
    CaptureLimitExceeded { stream: &'static str, limit: u64 },

    #[error("failed to collect compiler output")]
    Io(#[from] io::Error),
}

/// Runs a [`ProcessInvocation`] to completion.
pub trait Executor {
    fn execute(&self, invocation: &ProcessInvocation) -> Result<ProcessOutput, ExecError>;
}

impl<F> Executor for F
where
    F: Fn(&ProcessInvocation) -> Result<ProcessOutput, ExecError>,
{
    fn execute(&self, invocation: &ProcessInvocation) -> Result<ProcessOutput, ExecError> {
        self(invocation)
    }
}

/// Executor backed by [`std::process::Command`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemExecutor;

impl Executor for SystemExecutor {
    fn execute(&self, invocation: &ProcessInvocation) -> Result<ProcessOutput, ExecError> {
        let mut child = Command::new(&invocation.executable)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ExecError::Spawn {
                executable: invocation.executable.clone(),
                source,
            })?;

        let limit = invocation.capture_limit_bytes;
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        // Both pipes are drained concurrently so neither can fill up and
        // stall the compiler.
        let (stdout, stderr) = thread::scope(|s| {
            let out = s.spawn(move || read_capped(stdout, limit));
            let err = s.spawn(move || read_capped(stderr, limit));
            (join_reader(out), join_reader(err))
        });
        collect_output(&mut child, stdout, stderr, limit)
    }
}

type Captured = io::Result<(Vec<u8>, bool)>;

/// Reap `child`, then surface reader failures and overflow.
fn collect_output(
    child: &mut Child,
    stdout: Captured,
    stderr: Captured,
    limit: u64,
) -> Result<ProcessOutput, ExecError> {
    let status = child.wait()?;
    let (stdout, stdout_overflow) = stdout?;
    let (stderr, stderr_overflow) = stderr?;

    if stdout_overflow {
        return Err(ExecError::CaptureLimitExceeded {
            stream: "stdout",
            limit,
        });
    }
    if stderr_overflow {
        return Err(ExecError::CaptureLimitExceeded {
            stream: "stderr",
            limit,
        });
    }

    Ok(ProcessOutput {
        code: status.code(),
        stdout: String::from_utf8_lossy(&stdout).into_owned(),
        stderr: String::from_utf8_lossy(&stderr).into_owned(),
    })
}

fn join_reader(handle: thread::ScopedJoinHandle<'_, Captured>) -> Captured {
    handle
        .join()
        .unwrap_or_else(|_| Err(io::Error::other("output reader panicked")))
}

/// Read up to `limit` bytes, then drain and discard the rest.
///
/// Returns the captured bytes and whether the limit was exceeded.
fn read_capped<R: Read>(pipe: Option<R>, limit: u64) -> Captured {
    let Some(pipe) = pipe else {
        return Ok((Vec::new(), false));
    };

    let mut buf = Vec::new();
    let mut limited = pipe.take(limit.saturating_add(1));
    limited.read_to_end(&mut buf)?;

    let overflowed = buf.len() as u64 > limit;
    if overflowed {
        buf.truncate(limit as usize);
        io::copy(&mut limited.into_inner(), &mut io::sink())?;
    }
    Ok((buf, overflowed))
}
