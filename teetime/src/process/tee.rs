//! The per-stream pump that fans a pipe out to its sinks.

use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::binding::{StreamBinding, StreamKind};
use crate::error::{TeeError, WaitError};
use crate::sink::Sink;

/// Bytes requested from the pipe per read.
pub const CHUNK_SIZE: usize = 16 * 1024;

/// What a finished tee hands back.
#[derive(Debug, Default)]
pub struct TeeSummary {
    /// Total bytes read from the pipe.
    pub bytes: u64,
    /// Non-fatal errors, in the order they happened.
    pub errors: Vec<TeeError>,
}

/// Drains one pipe into every sink of a binding.
///
/// The pump runs on its own tokio task from the moment the tee is created,
/// so the child never stalls on a full pipe waiting for a reader. Each chunk
/// is written to the sinks in binding order, one sink at a time.
///
/// A sink whose write fails is recorded and skipped from then on; the pipe
/// keeps being read and the remaining sinks keep receiving data. A pipe read
/// error ends the stream early but is otherwise handled like end of data.
#[derive(Debug)]
pub struct StreamTee {
    kind: StreamKind,
    bytes: Arc<AtomicU64>,
    task: JoinHandle<TeeSummary>,
}

impl StreamTee {
    /// Start pumping `pipe` into the sinks of `binding`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<R>(pipe: R, binding: StreamBinding) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let kind = binding.kind();
        let sinks = binding.into_sinks();
        debug!(stream = %kind, sinks = sinks.len(), "starting tee");
        let bytes = Arc::new(AtomicU64::new(0));
        let task = tokio::spawn(pump(pipe, kind, sinks, Arc::clone(&bytes)));
        Self { kind, bytes, task }
    }

    /// The stream this tee drains.
    pub const fn kind(&self) -> StreamKind {
        self.kind
    }

    /// Bytes read from the pipe so far.
    ///
    /// Still accurate after the pump task panicked.
    pub fn bytes_read(&self) -> u64 {
        self.bytes.load(Ordering::Acquire)
    }

    /// Whether the pump has finished.
    pub fn is_done(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the pump to finish.
    ///
    /// Cancel-safe: if the returned future is dropped the tee keeps running
    /// and can be joined again.
    pub async fn join(&mut self) -> Result<TeeSummary, WaitError> {
        (&mut self.task)
            .await
            .map_err(|source| WaitError::TeeAborted {
                stream: self.kind,
                source,
            })
    }
}

struct Target {
    sink: Box<dyn Sink>,
    healthy: bool,
}

async fn pump<R>(
    mut pipe: R,
    kind: StreamKind,
    sinks: Vec<Box<dyn Sink>>,
    read: Arc<AtomicU64>,
) -> TeeSummary
where
    R: AsyncRead + Unpin,
{
    let mut targets: Vec<Target> = sinks
        .into_iter()
        .map(|sink| Target {
            sink,
            healthy: true,
        })
        .collect();
    let mut summary = TeeSummary::default();
    let mut buf = vec![0u8; CHUNK_SIZE];

    loop {
        let n = match pipe.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(source) => {
                warn!(stream = %kind, error = %source, "pipe read failed, ending stream");
                summary.errors.push(TeeError::PipeRead {
                    stream: kind,
                    source,
                });
                break;
            }
        };
        summary.bytes += n as u64;
        read.store(summary.bytes, Ordering::Release);
        let chunk = &buf[..n];

        for (index, target) in targets.iter_mut().enumerate() {
            if !target.healthy {
                continue;
            }
            if let Err(source) = target.sink.write(chunk).await {
                let name = target.sink.name().to_string();
                warn!(stream = %kind, sink = %name, index, error = %source, "sink write failed, dropping sink");
                target.healthy = false;
                summary.errors.push(TeeError::SinkWrite {
                    stream: kind,
                    index,
                    name,
                    source,
                });
            }
        }
    }

    for (index, target) in targets.iter_mut().enumerate() {
        if !target.healthy {
            continue;
        }
        if let Err(source) = target.sink.flush().await {
            let name = target.sink.name().to_string();
            warn!(stream = %kind, sink = %name, index, error = %source, "sink flush failed");
            summary.errors.push(TeeError::SinkFlush {
                stream: kind,
                index,
                name,
                source,
            });
        }
    }

    debug!(stream = %kind, bytes = summary.bytes, errors = summary.errors.len(), "tee drained");
    summary
}
