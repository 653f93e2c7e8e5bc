//! Error types for launching, teeing and waiting.

use std::io;

use thiserror::Error;
use tokio::task::JoinError;

use crate::process::StreamKind;

/// The child process could not be created. No tee is started when this occurs.
#[derive(Error, Debug)]
pub enum LaunchError {
    /// The command had no program to run.
    #[error("empty command")]
    EmptyCommand,

    /// The operating system refused to spawn the program.
    #[error("failed to spawn process `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
}

/// A non-fatal error recorded by a stream tee.
///
/// These never abort the other sinks or the other stream; they are collected
/// and handed back in [`ExitReport::sink_errors`](crate::ExitReport).
#[derive(Error, Debug)]
pub enum TeeError {
    /// A sink rejected a write and was dropped from the rest of the stream.
    #[error("{stream}: write to sink #{index} ({name}) failed: {source}")]
    SinkWrite {
        stream: StreamKind,
        index: usize,
        name: String,
        #[source]
        source: io::Error,
    },

    /// A sink failed to flush at end of stream.
    #[error("{stream}: flush of sink #{index} ({name}) failed: {source}")]
    SinkFlush {
        stream: StreamKind,
        index: usize,
        name: String,
        #[source]
        source: io::Error,
    },

    /// The pipe itself failed; treated as end of data.
    #[error("{stream}: pipe read failed: {source}")]
    PipeRead {
        stream: StreamKind,
        #[source]
        source: io::Error,
    },
}

impl TeeError {
    /// The stream this error was recorded on.
    pub const fn stream(&self) -> StreamKind {
        match self {
            Self::SinkWrite { stream, .. }
            | Self::SinkFlush { stream, .. }
            | Self::PipeRead { stream, .. } => *stream,
        }
    }

    /// Name of the sink at fault, if the error is attributable to one.
    pub fn sink_name(&self) -> Option<&str> {
        match self {
            Self::SinkWrite { name, .. } | Self::SinkFlush { name, .. } => Some(name),
            Self::PipeRead { .. } => None,
        }
    }

    /// Position of the sink at fault within its binding.
    pub const fn sink_index(&self) -> Option<usize> {
        match self {
            Self::SinkWrite { index, .. } | Self::SinkFlush { index, .. } => Some(*index),
            Self::PipeRead { .. } => None,
        }
    }
}

/// Waiting for a process failed.
#[derive(Error, Debug)]
pub enum WaitError {
    /// A tee task did not run to completion (a sink panicked).
    #[error("{stream} tee task aborted: {source}")]
    TeeAborted {
        stream: StreamKind,
        #[source]
        source: JoinError,
    },

    /// Reaping the child failed.
    #[error("failed to wait for process exit: {0}")]
    Exit(#[source] io::Error),
}

/// Any error from the one-shot [`run`](crate::run) helper.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Launch(#[from] LaunchError),
    #[error(transparent)]
    Wait(#[from] WaitError),
}
