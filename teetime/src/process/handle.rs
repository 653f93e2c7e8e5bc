//! The caller's view of a tee'd child process.

use std::io;
use std::process::ExitStatus;

use tokio::process::{Child, ChildStdin};
use tracing::debug;

use super::binding::StreamKind;
use super::tee::StreamTee;
use crate::error::{TeeError, WaitError};

/// Where a [`ProcessHandle`] is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleState {
    /// The child was spawned and nobody has waited on it yet.
    Running,
    /// `wait()` has started joining tees or reaping the child.
    Draining,
    /// The child was reaped and every tee drained.
    Exited,
}

/// Outcome of a finished process.
#[derive(Debug)]
pub struct ExitReport {
    /// Exit status reported by the operating system.
    pub status: ExitStatus,

    /// Non-fatal tee errors, stdout's first, each in the order they occurred.
    pub sink_errors: Vec<TeeError>,

    /// Bytes read from stdout, or `None` if it was passed through.
    pub stdout_bytes: Option<u64>,

    /// Bytes read from stderr, or `None` if it was passed through.
    pub stderr_bytes: Option<u64>,
}

impl ExitReport {
    /// Check if the process exited successfully.
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Get the exit code, if the process exited normally.
    pub fn code(&self) -> Option<i32> {
        self.status.code()
    }

    /// Exit code in shell convention: `128 + signal` when killed by a signal.
    pub fn exit_code(&self) -> i32 {
        if let Some(code) = self.status.code() {
            return code;
        }
        signal_exit_code(self.status)
    }

    /// Whether any sink or pipe error was recorded.
    pub fn has_sink_errors(&self) -> bool {
        !self.sink_errors.is_empty()
    }
}

#[cfg(unix)]
fn signal_exit_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    status.signal().map_or(1, |signal| 128 + signal)
}

#[cfg(not(unix))]
fn signal_exit_code(_status: ExitStatus) -> i32 {
    1
}

/// A running child whose output streams may be teed.
///
/// Returned by [`launch`](crate::launch) with the child already running and
/// every tee already pumping. [`wait`](Self::wait) is the only way to the
/// exit status: it first drains every tee, then reaps the child, so an exit
/// code is never observed while output is still in flight.
#[derive(Debug)]
pub struct ProcessHandle {
    child: Child,
    tees: Vec<StreamTee>,
    intercepted: [bool; 2],
    state: HandleState,
    sink_errors: Vec<TeeError>,
    stdout_bytes: Option<u64>,
    stderr_bytes: Option<u64>,
    report: Option<ExitReport>,
}

impl ProcessHandle {
    pub(crate) fn new(child: Child, tees: Vec<StreamTee>) -> Self {
        let intercepted = [
            tees.iter().any(|t| t.kind() == StreamKind::Stdout),
            tees.iter().any(|t| t.kind() == StreamKind::Stderr),
        ];
        Self {
            child,
            tees,
            intercepted,
            state: HandleState::Running,
            sink_errors: Vec::new(),
            stdout_bytes: None,
            stderr_bytes: None,
            report: None,
        }
    }

    /// OS process id, or `None` once the child has been reaped.
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Current lifecycle state.
    pub const fn state(&self) -> HandleState {
        self.state
    }

    /// Whether `kind` was intercepted (`false` means passed through).
    pub const fn is_intercepted(&self, kind: StreamKind) -> bool {
        match kind {
            StreamKind::Stdout => self.intercepted[0],
            StreamKind::Stderr => self.intercepted[1],
        }
    }

    /// Number of tees not yet joined.
    pub fn pending_tees(&self) -> usize {
        self.tees.len()
    }

    /// Take the child's stdin, if it was launched with [`StdinMode::Piped`](crate::StdinMode::Piped).
    ///
    /// Drop it to signal end of input.
    pub fn take_stdin(&mut self) -> Option<ChildStdin> {
        self.child.stdin.take()
    }

    /// Ask the OS to kill the child without waiting.
    ///
    /// The tees still drain whatever the child wrote; call [`wait`](Self::wait)
    /// afterwards as usual.
    pub fn start_kill(&mut self) -> io::Result<()> {
        self.child.start_kill()
    }

    /// The cached report, if [`wait`](Self::wait) has completed.
    pub const fn report(&self) -> Option<&ExitReport> {
        self.report.as_ref()
    }

    /// Drain every tee, then reap the child.
    ///
    /// The first successful call caches the report; later calls return it
    /// without joining or querying the child again. Dropping the future
    /// part way through is safe: tees already joined stay accounted for and
    /// the rest are joined by the next call.
    pub async fn wait(&mut self) -> Result<&ExitReport, WaitError> {
        let report = match self.report.take() {
            Some(report) => report,
            None => self.settle().await?,
        };
        Ok(&*self.report.insert(report))
    }

    /// Wait and take ownership of the report.
    pub async fn finish(mut self) -> Result<ExitReport, WaitError> {
        match self.report.take() {
            Some(report) => Ok(report),
            None => self.settle().await,
        }
    }

    async fn settle(&mut self) -> Result<ExitReport, WaitError> {
        self.state = HandleState::Draining;

        // Joined front to back so stdout's errors come first. A tee leaves
        // the list only once its task has completed, even if it panicked,
        // and its byte count is recorded either way.
        while let Some(tee) = self.tees.first_mut() {
            let kind = tee.kind();
            let joined = tee.join().await;
            let bytes = tee.bytes_read();
            self.tees.remove(0);
            match kind {
                StreamKind::Stdout => self.stdout_bytes = Some(bytes),
                StreamKind::Stderr => self.stderr_bytes = Some(bytes),
            }
            let summary = joined?;
            debug!(stream = %kind, bytes, "tee joined");
            self.sink_errors.extend(summary.errors);
        }

        let status = self.child.wait().await.map_err(WaitError::Exit)?;
        debug!(?status, "process exited");
        self.state = HandleState::Exited;

        Ok(ExitReport {
            status,
            sink_errors: std::mem::take(&mut self.sink_errors),
            stdout_bytes: self.stdout_bytes,
            stderr_bytes: self.stderr_bytes,
        })
    }
}
