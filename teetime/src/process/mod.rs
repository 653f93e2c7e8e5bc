//! Launching child processes with teed output.
//!
//! [`launch`] spawns the child and starts one [`StreamTee`] per stream that
//! has sinks. The returned [`ProcessHandle`] joins those tees before it
//! reaps the child.

mod binding;
mod handle;
mod launcher;
mod options;
mod tee;

pub use binding::{Sinks, StreamBinding, StreamKind};
pub use handle::{ExitReport, HandleState, ProcessHandle};
pub use launcher::{launch, run};
pub use options::{ProcessOptions, StdinMode};
pub use tee::{StreamTee, TeeSummary, CHUNK_SIZE};
