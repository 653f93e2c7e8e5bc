//! Byte sinks that a stream tee writes into.
//!
//! A [`Sink`] is deliberately narrow: write a chunk, optionally flush at end
//! of stream. Anything that can take bytes (files, buffers, channels, another
//! process's stdin) fits behind it.

mod buffered;
mod memory;
mod shared;
mod writer;

use std::io;

use async_trait::async_trait;

pub use buffered::{Buffered, Buffering, DEFAULT_BLOCK_SIZE};
pub use memory::{ChannelSink, FnSink, MemorySink};
pub use shared::SharedSink;
pub use writer::WriterSink;

/// A destination for a stream's bytes.
///
/// Chunks arrive in the order the child produced them, but chunk boundaries
/// are arbitrary: implementations must treat the calls as one continuous byte
/// sequence.
///
/// A sink handed to both streams is written from two tasks. It must serialize
/// its own writes; wrap it in a [`SharedSink`] if it does not.
#[async_trait]
pub trait Sink: Send {
    /// Write the whole chunk.
    async fn write(&mut self, chunk: &[u8]) -> io::Result<()>;

    /// Called once after the last chunk.
    async fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// Label used in logs and error reports.
    fn name(&self) -> &str {
        "sink"
    }
}

#[async_trait]
impl<S: Sink + ?Sized> Sink for Box<S> {
    async fn write(&mut self, chunk: &[u8]) -> io::Result<()> {
        (**self).write(chunk).await
    }

    async fn flush(&mut self) -> io::Result<()> {
        (**self).flush().await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
