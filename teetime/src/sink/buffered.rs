//! Buffering modes, resolved before a sink reaches the tee.

use std::io;

use async_trait::async_trait;

use super::Sink;

/// How a [`Buffered`] sink forwards bytes to the sink it wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Buffering {
    /// Forward every chunk immediately and flush the inner sink after it.
    Unbuffered,
    /// Forward only complete lines; hold any trailing partial line.
    Line,
    /// Forward once at least this many bytes are held.
    Block(usize),
}

/// Default block size for [`Buffering::Block`].
pub const DEFAULT_BLOCK_SIZE: usize = 8 * 1024;

impl Default for Buffering {
    /// Block buffering with [`DEFAULT_BLOCK_SIZE`].
    fn default() -> Self {
        Self::Block(DEFAULT_BLOCK_SIZE)
    }
}

/// Applies a [`Buffering`] mode in front of another sink.
///
/// Whatever is still held at end of stream is forwarded on [`Sink::flush`],
/// so the inner sink always ends up with the exact byte sequence.
#[derive(Debug)]
pub struct Buffered<S> {
    inner: S,
    mode: Buffering,
    held: Vec<u8>,
}

impl<S: Sink> Buffered<S> {
    /// Wrap `inner` with the given mode.
    pub const fn new(inner: S, mode: Buffering) -> Self {
        Self {
            inner,
            mode,
            held: Vec::new(),
        }
    }

    /// The mode this sink was built with.
    pub const fn mode(&self) -> Buffering {
        self.mode
    }

    /// Unwrap the inner sink. Held bytes are discarded.
    pub fn into_inner(self) -> S {
        self.inner
    }

    async fn forward_held(&mut self) -> io::Result<()> {
        if self.held.is_empty() {
            return Ok(());
        }
        let held = std::mem::take(&mut self.held);
        self.inner.write(&held).await
    }
}

#[async_trait]
impl<S: Sink> Sink for Buffered<S> {
    async fn write(&mut self, chunk: &[u8]) -> io::Result<()> {
        match self.mode {
            Buffering::Unbuffered => {
                self.inner.write(chunk).await?;
                self.inner.flush().await
            }
            Buffering::Line => {
                let Some(last_newline) = chunk.iter().rposition(|&b| b == b'\n') else {
                    self.held.extend_from_slice(chunk);
                    return Ok(());
                };
                let (lines, rest) = chunk.split_at(last_newline + 1);
                if self.held.is_empty() {
                    self.inner.write(lines).await?;
                } else {
                    self.held.extend_from_slice(lines);
                    self.forward_held().await?;
                }
                self.held.extend_from_slice(rest);
                Ok(())
            }
            Buffering::Block(size) => {
                self.held.extend_from_slice(chunk);
                if self.held.len() >= size {
                    self.forward_held().await?;
                }
                Ok(())
            }
        }
    }

    async fn flush(&mut self) -> io::Result<()> {
        self.forward_held().await?;
        self.inner.flush().await
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
