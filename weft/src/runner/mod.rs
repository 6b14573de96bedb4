//! Concurrent runner for fixed sets of repeating workers.
//!
//! Each worker is an independent Tokio task that emits its pattern to a
//! shared [`OutputSink`] until cancelled. The runner owns the handles; callers
//! get a [`RunningSet`] token to cancel and join with.

mod cancel;
mod run;
mod sink;
mod worker;

pub use cancel::CancelFlag;
pub use run::{JoinResult, RunId, RunningSet, WorkerRunner};
pub use sink::{LineSink, MemorySink, OutputSink, DEFAULT_MEMORY_LINES};
