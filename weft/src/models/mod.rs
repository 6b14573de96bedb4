//! Data models for workers and their output patterns.

mod pattern;
mod worker;

pub use pattern::{PatternKind, UnknownPattern, LINE_WIDTH};
pub use worker::{WorkerId, WorkerSpec};
