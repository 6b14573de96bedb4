//! Weft - run fixed sets of repeating workers in parallel.
//!
//! Workers print simple repeating patterns (counters, letters, banners) to a
//! shared line sink until they are cancelled. The runner starts them,
//! cancels them, and joins them with an optional timeout.
//!
//! A separate [`process`] module launches external programs from a command
//! line; the runner never uses it.

pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod process;
pub mod runner;

pub use error::{LaunchError, RunnerError};
