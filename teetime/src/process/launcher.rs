//! Spawning a child with its output streams teed.

use std::process::Stdio;

use tracing::debug;

use super::binding::{Sinks, StreamBinding};
use super::handle::{ExitReport, ProcessHandle};
use super::options::ProcessOptions;
use super::tee::StreamTee;
use crate::error::{Error, LaunchError};

/// Spawn a process and start teeing its output.
///
/// A stream with sinks gets a pipe and a [`StreamTee`] that is already
/// running when this returns. A stream without sinks inherits the launching
/// process's stream and costs nothing extra. The decision is made once here
/// and fixed for the life of the handle.
///
/// Must be called from within a tokio runtime.
///
/// # Example
///
/// ```rust,no_run
/// use teetime::{launch, MemorySink, ProcessOptions, Sinks, WriterSink};
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let captured = MemorySink::new();
///     let mut handle = launch(
///         ProcessOptions::new("cargo").arg("build"),
///         Sinks::new()
///             .stderr(WriterSink::stderr())
///             .stderr(captured.clone()),
///     )?;
///
///     let report = handle.wait().await?;
///     println!("exit: {:?}, captured {} bytes", report.code(), captured.len());
///     Ok(())
/// }
/// ```
pub fn launch(options: ProcessOptions, sinks: Sinks) -> Result<ProcessHandle, LaunchError> {
    if options.program.is_empty() {
        return Err(LaunchError::EmptyCommand);
    }

    let Sinks { stdout, stderr } = sinks;
    let mut cmd = options.to_command();
    cmd.stdout(stdio_for(&stdout));
    cmd.stderr(stdio_for(&stderr));

    let mut child = cmd.spawn().map_err(|source| LaunchError::Spawn {
        program: options.program.clone(),
        source,
    })?;

    debug!(
        program = %options.program,
        pid = child.id(),
        tee_stdout = !stdout.is_empty(),
        tee_stderr = !stderr.is_empty(),
        "spawned process"
    );

    let mut tees = Vec::with_capacity(2);
    if let Some(pipe) = child.stdout.take() {
        tees.push(StreamTee::spawn(pipe, stdout));
    }
    if let Some(pipe) = child.stderr.take() {
        tees.push(StreamTee::spawn(pipe, stderr));
    }

    Ok(ProcessHandle::new(child, tees))
}

/// Launch a process and wait for it, draining all output.
pub async fn run(options: ProcessOptions, sinks: Sinks) -> Result<ExitReport, Error> {
    let handle = launch(options, sinks)?;
    Ok(handle.finish().await?)
}

fn stdio_for(binding: &StreamBinding) -> Stdio {
    if binding.is_empty() {
        Stdio::inherit()
    } else {
        Stdio::piped()
    }
}
