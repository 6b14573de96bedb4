//! External process launching.
//!
//! Kept apart from the worker runner: the runner never launches processes.

mod launch;

pub use launch::{launch, launch_with, LaunchOptions, ProcessHandle};
