//! A sink that several streams can write to.

use std::io;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::Sink;

/// Shares one sink between bindings.
///
/// Clones point at the same inner sink. Each chunk is written while holding
/// the lock, so chunks from stdout and stderr never interleave mid-chunk.
/// The relative order of the two streams is whatever order their tees reach
/// the lock.
#[derive(Debug)]
pub struct SharedSink<S> {
    name: Arc<str>,
    inner: Arc<Mutex<S>>,
}

impl<S: Sink> SharedSink<S> {
    /// Wrap a sink for sharing.
    pub fn new(sink: S) -> Self {
        let name = Arc::from(sink.name());
        Self {
            name,
            inner: Arc::new(Mutex::new(sink)),
        }
    }

    /// Run a closure against the inner sink.
    pub async fn with<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        let mut guard = self.inner.lock().await;
        f(&mut guard)
    }
}

impl<S> Clone for SharedSink<S> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            inner: Arc::clone(&self.inner),
        }
    }
}

#[async_trait]
impl<S: Sink> Sink for SharedSink<S> {
    async fn write(&mut self, chunk: &[u8]) -> io::Result<()> {
        self.inner.lock().await.write(chunk).await
    }

    async fn flush(&mut self) -> io::Result<()> {
        self.inner.lock().await.flush().await
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;

    #[tokio::test]
    async fn test_clones_write_to_same_sink() {
        let memory = MemorySink::named("log");
        let mut a = SharedSink::new(memory.clone());
        let mut b = a.clone();

        a.write(b"out ").await.unwrap();
        b.write(b"err").await.unwrap();

        assert_eq!(memory.contents(), b"out err");
        assert_eq!(b.name(), "log");
        assert_eq!(a.with(|inner| inner.len()).await, 7);
    }
}
