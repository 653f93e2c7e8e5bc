//! Teetime - spawn child processes and tee their output.
//!
//! A child's stdout and stderr can each be copied to any number of
//! [`Sink`]s while the child runs, and the caller still gets an awaitable
//! [`ProcessHandle`]. Waiting on the handle drains every stream into every
//! sink before the exit status is returned.
//!
//! ```rust,no_run
//! use teetime::{run, MemorySink, ProcessOptions, Sinks, WriterSink};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let log = MemorySink::named("log");
//!     let report = run(
//!         ProcessOptions::from_command(["sh", "-c", "echo hi; echo oops >&2"])?,
//!         Sinks::new()
//!             .stdout(WriterSink::stdout())
//!             .stderr(WriterSink::stderr())
//!             .both(log.clone()),
//!     )
//!     .await?;
//!
//!     println!("exit {}, logged {} bytes", report.exit_code(), log.len());
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod process;
pub mod sink;

pub use error::{Error, LaunchError, TeeError, WaitError};
pub use process::{
    launch, run, ExitReport, HandleState, ProcessHandle, ProcessOptions, Sinks, StdinMode,
    StreamBinding, StreamKind, StreamTee, TeeSummary, CHUNK_SIZE,
};
pub use sink::{
    Buffered, Buffering, ChannelSink, FnSink, MemorySink, SharedSink, Sink, WriterSink,
    DEFAULT_BLOCK_SIZE,
};
