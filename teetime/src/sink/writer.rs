//! Sinks backed by tokio writers.

use std::io;
use std::path::Path;

use async_trait::async_trait;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncWrite, AsyncWriteExt, Stderr, Stdout};

use super::Sink;

/// Adapts any [`AsyncWrite`] into a [`Sink`].
///
/// Covers files, the parent's own stdout/stderr and another child's stdin.
#[derive(Debug)]
pub struct WriterSink<W> {
    name: String,
    inner: W,
}

impl<W> WriterSink<W>
where
    W: AsyncWrite + Unpin + Send,
{
    /// Wrap a writer.
    pub fn new(inner: W) -> Self {
        Self {
            name: "writer".to_string(),
            inner,
        }
    }

    /// Set the label used in error reports.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Get a reference to the wrapped writer.
    pub const fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Unwrap the writer.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl WriterSink<Stdout> {
    /// The launching process's own stdout.
    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout()).with_name("stdout")
    }
}

impl WriterSink<Stderr> {
    /// The launching process's own stderr.
    pub fn stderr() -> Self {
        Self::new(tokio::io::stderr()).with_name("stderr")
    }
}

impl WriterSink<File> {
    /// Create (or truncate) a file.
    pub async fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).await?;
        Ok(Self::new(file).with_name(path.display().to_string()))
    }

    /// Open a file for appending, creating it if needed.
    pub async fn append(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;
        Ok(Self::new(file).with_name(path.display().to_string()))
    }
}

#[async_trait]
impl<W> Sink for WriterSink<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn write(&mut self, chunk: &[u8]) -> io::Result<()> {
        self.inner.write_all(chunk).await
    }

    async fn flush(&mut self) -> io::Result<()> {
        self.inner.flush().await
    }

    fn name(&self) -> &str {
        &self.name
    }
}
