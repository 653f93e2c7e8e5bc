//! Which sinks each output stream feeds.

use std::fmt;

use crate::sink::{Buffered, Buffering, SharedSink, Sink};

/// One of a child's two output streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    /// Primary output.
    Stdout,
    /// Diagnostic output.
    Stderr,
}

impl StreamKind {
    /// Short lowercase name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
        }
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stream and the ordered sinks its bytes are copied to.
///
/// Sinks are written one after another in insertion order. Once the binding
/// is handed to a [`StreamTee`](crate::StreamTee) it is owned by that tee and
/// can no longer change.
pub struct StreamBinding {
    kind: StreamKind,
    sinks: Vec<Box<dyn Sink>>,
}

impl StreamBinding {
    /// An empty binding for `kind`.
    pub const fn new(kind: StreamKind) -> Self {
        Self {
            kind,
            sinks: Vec::new(),
        }
    }

    /// Append a sink.
    pub fn push(&mut self, sink: impl Sink + 'static) {
        self.sinks.push(Box::new(sink));
    }

    /// Append an already boxed sink.
    pub fn push_boxed(&mut self, sink: Box<dyn Sink>) {
        self.sinks.push(sink);
    }

    /// The stream this binding belongs to.
    pub const fn kind(&self) -> StreamKind {
        self.kind
    }

    /// Number of sinks.
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    /// Whether the stream should be passed through rather than intercepted.
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    pub(crate) fn into_sinks(self) -> Vec<Box<dyn Sink>> {
        self.sinks
    }
}

impl fmt::Debug for StreamBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.sinks.iter().map(|s| s.name()).collect();
        f.debug_struct("StreamBinding")
            .field("kind", &self.kind)
            .field("sinks", &names)
            .finish()
    }
}

/// Sinks for both output streams of one launch.
///
/// A stream left without sinks is passed through to the launching process.
///
/// ```rust,no_run
/// use teetime::{MemorySink, Sinks, WriterSink};
///
/// let captured = MemorySink::new();
/// let sinks = Sinks::new()
///     .stdout(WriterSink::stdout())
///     .stdout(captured.clone())
///     .both(MemorySink::named("combined"));
/// ```
#[derive(Debug)]
pub struct Sinks {
    pub(crate) stdout: StreamBinding,
    pub(crate) stderr: StreamBinding,
}

impl Default for Sinks {
    fn default() -> Self {
        Self::new()
    }
}

impl Sinks {
    /// No sinks: both streams pass through.
    pub const fn new() -> Self {
        Self {
            stdout: StreamBinding::new(StreamKind::Stdout),
            stderr: StreamBinding::new(StreamKind::Stderr),
        }
    }

    /// Add a sink for stdout.
    #[must_use]
    pub fn stdout(mut self, sink: impl Sink + 'static) -> Self {
        self.stdout.push(sink);
        self
    }

    /// Add a sink for stderr.
    #[must_use]
    pub fn stderr(mut self, sink: impl Sink + 'static) -> Self {
        self.stderr.push(sink);
        self
    }

    /// Add one sink to both streams.
    ///
    /// The sink is wrapped in a [`SharedSink`] so the two tees take turns
    /// writing whole chunks.
    /// To buffer the sink, use [`both_with`](Self::both_with) rather than
    /// passing in a [`Buffered`] that both streams would share.
    #[must_use]
    pub fn both<S: Sink + 'static>(mut self, sink: S) -> Self {
        let shared = SharedSink::new(sink);
        self.stdout.push(shared.clone());
        self.stderr.push(shared);
        self
    }

    /// Add one sink to both streams, buffering each stream separately.
    ///
    /// Each stream gets its own [`Buffered`] in front of the shared sink, so
    /// a partial line held for stdout is never glued onto a line from
    /// stderr. With [`Buffering::Line`] the sink receives whole lines from
    /// one stream at a time.
    #[must_use]
    pub fn both_with<S: Sink + 'static>(mut self, sink: S, mode: Buffering) -> Self {
        let shared = SharedSink::new(sink);
        self.stdout.push(Buffered::new(shared.clone(), mode));
        self.stderr.push(Buffered::new(shared, mode));
        self
    }

    /// Add a sink to the given stream.
    #[must_use]
    pub fn with(self, kind: StreamKind, sink: impl Sink + 'static) -> Self {
        match kind {
            StreamKind::Stdout => self.stdout(sink),
            StreamKind::Stderr => self.stderr(sink),
        }
    }

    /// The binding for one stream.
    pub const fn binding(&self, kind: StreamKind) -> &StreamBinding {
        match kind {
            StreamKind::Stdout => &self.stdout,
            StreamKind::Stderr => &self.stderr,
        }
    }

    /// Whether neither stream has any sink.
    pub fn is_empty(&self) -> bool {
        self.stdout.is_empty() && self.stderr.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;

    #[test]
    fn test_both_binds_to_each_stream() {
        let sinks = Sinks::new()
            .stdout(MemorySink::named("a"))
            .both(MemorySink::named("log"));

        assert_eq!(sinks.binding(StreamKind::Stdout).len(), 2);
        assert_eq!(sinks.binding(StreamKind::Stderr).len(), 1);
        assert!(!sinks.is_empty());
    }

    #[test]
    fn test_both_with_binds_to_each_stream() {
        let sinks = Sinks::new().both_with(MemorySink::named("log"), Buffering::Line);

        assert_eq!(sinks.binding(StreamKind::Stdout).len(), 1);
        assert_eq!(sinks.binding(StreamKind::Stderr).len(), 1);
        assert!(format!("{:?}", sinks.binding(StreamKind::Stderr)).contains("log"));
    }

    #[test]
    fn test_default_passes_through() {
        let sinks = Sinks::default();
        assert!(sinks.is_empty());
        assert!(sinks.binding(StreamKind::Stdout).is_empty());
    }

    #[test]
    fn test_stream_kind_display() {
        assert_eq!(StreamKind::Stdout.to_string(), "stdout");
        assert_eq!(StreamKind::Stderr.to_string(), "stderr");
    }
}
