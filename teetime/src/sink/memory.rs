//! In-process sinks: buffers, channels and callbacks.

use std::io;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::Sink;

/// Cloneable in-memory buffer.
///
/// Every clone shares the same bytes, so the caller keeps one clone and hands
/// the others to the tee. Writes are serialized by a mutex, which makes it
/// safe to bind one buffer to both streams.
#[derive(Debug, Clone)]
pub struct MemorySink {
    name: Arc<str>,
    buf: Arc<Mutex<Vec<u8>>>,
}

impl MemorySink {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::named("memory")
    }

    /// Create an empty buffer with a label for error reports.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Arc::from(name.into()),
            buf: Arc::default(),
        }
    }

    /// Copy of everything written so far.
    pub fn contents(&self) -> Vec<u8> {
        self.buf
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Contents decoded as UTF-8, replacing invalid sequences.
    pub fn to_string_lossy(&self) -> String {
        let buf = self.buf.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Number of bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether nothing has been written yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Sink for MemorySink {
    async fn write(&mut self, chunk: &[u8]) -> io::Result<()> {
        self.buf
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(chunk);
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Forwards every chunk over a bounded channel.
///
/// Backpressure from a full channel stalls the tee, and with it the child.
/// A closed receiver is reported as a broken pipe.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    name: Arc<str>,
    tx: mpsc::Sender<Vec<u8>>,
}

impl ChannelSink {
    /// Wrap an existing sender.
    pub fn new(tx: mpsc::Sender<Vec<u8>>) -> Self {
        Self {
            name: Arc::from("channel"),
            tx,
        }
    }

    /// Create a sink together with the receiving end.
    pub fn channel(buffer: usize) -> (Self, mpsc::Receiver<Vec<u8>>) {
        let (tx, rx) = mpsc::channel(buffer);
        (Self::new(tx), rx)
    }

    /// Set the label used in error reports.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Arc::from(name.into());
        self
    }
}

#[async_trait]
impl Sink for ChannelSink {
    async fn write(&mut self, chunk: &[u8]) -> io::Result<()> {
        self.tx
            .send(chunk.to_vec())
            .await
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "channel receiver dropped"))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Calls a closure for every chunk.
pub struct FnSink<F> {
    name: String,
    f: F,
}

impl<F> FnSink<F>
where
    F: FnMut(&[u8]) -> io::Result<()> + Send,
{
    /// Wrap a callback.
    pub fn new(f: F) -> Self {
        Self {
            name: "callback".to_string(),
            f,
        }
    }

    /// Set the label used in error reports.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl<F> std::fmt::Debug for FnSink<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnSink").field("name", &self.name).finish_non_exhaustive()
    }
}

#[async_trait]
impl<F> Sink for FnSink<F>
where
    F: FnMut(&[u8]) -> io::Result<()> + Send,
{
    async fn write(&mut self, chunk: &[u8]) -> io::Result<()> {
        (self.f)(chunk)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_sink_clones_share_buffer() {
        let sink = MemorySink::named("a");
        let mut writer = sink.clone();

        writer.write(b"hel").await.unwrap();
        writer.write(b"lo").await.unwrap();

        assert_eq!(sink.contents(), b"hello");
        assert_eq!(sink.to_string_lossy(), "hello");
        assert_eq!(sink.len(), 5);
        assert_eq!(writer.name(), "a");
    }

    #[tokio::test]
    async fn test_channel_sink_forwards_chunks() {
        let (mut sink, mut rx) = ChannelSink::channel(4);

        sink.write(b"one").await.unwrap();
        sink.write(b"two").await.unwrap();

        assert_eq!(rx.recv().await.unwrap(), b"one");
        assert_eq!(rx.recv().await.unwrap(), b"two");
    }

    #[tokio::test]
    async fn test_channel_sink_closed_receiver() {
        let (mut sink, rx) = ChannelSink::channel(1);
        drop(rx);

        let err = sink.write(b"lost").await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[tokio::test]
    async fn test_fn_sink_calls_closure() {
        let mut seen = Vec::new();
        {
            let mut sink = FnSink::new(|chunk: &[u8]| {
                seen.extend_from_slice(chunk);
                Ok(())
            });
            sink.write(b"abc").await.unwrap();
        }
        assert_eq!(seen, b"abc");
    }
}
