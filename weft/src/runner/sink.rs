//! Line sinks shared by all workers.
//!
//! A sink is the only state workers share. Every `write_line` call holds the
//! sink's lock for the whole line and flushes before releasing it, so lines
//! from different workers never interleave and nothing piles up in a buffer.

use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Destination for worker output, one line per call.
pub trait OutputSink: Send + Sync {
    /// Write `line` followed by a newline, atomically with respect to other
    /// callers, and flush it.
    fn write_line(&self, line: &str) -> io::Result<()>;
}

/// Sink over any writer, serialized by a mutex.
#[derive(Debug)]
pub struct LineSink<W> {
    writer: Mutex<W>,
}

impl<W: Write> LineSink<W> {
    /// Wrap a writer.
    pub const fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Unwrap the inner writer.
    pub fn into_inner(self) -> W {
        self.writer.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl LineSink<io::Stdout> {
    /// Sink writing to the process's standard output.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> OutputSink for LineSink<W> {
    fn write_line(&self, line: &str) -> io::Result<()> {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writeln!(writer, "{line}")?;
        writer.flush()
    }
}

/// Lines a [`MemorySink`] keeps unless told otherwise.
pub const DEFAULT_MEMORY_LINES: usize = 65_536;

/// Sink that keeps the most recent lines in memory.
///
/// Holds at most `limit` lines; older lines are discarded and counted in
/// [`MemorySink::dropped`].
#[derive(Debug)]
pub struct MemorySink {
    limit: usize,
    state: Mutex<Retained>,
}

#[derive(Debug, Default)]
struct Retained {
    lines: VecDeque<String>,
    dropped: u64,
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::with_limit(DEFAULT_MEMORY_LINES)
    }
}

impl MemorySink {
    /// Create an empty sink holding up to [`DEFAULT_MEMORY_LINES`] lines.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty sink holding up to `limit` lines (at least one).
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
            state: Mutex::new(Retained::default()),
        }
    }

    /// Snapshot of the retained lines, oldest first.
    pub fn lines(&self) -> Vec<String> {
        self.guard().lines.iter().cloned().collect()
    }

    /// Number of retained lines.
    pub fn len(&self) -> usize {
        self.guard().lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guard().lines.is_empty()
    }

    /// Lines discarded to stay within the limit.
    pub fn dropped(&self) -> u64 {
        self.guard().dropped
    }

    fn guard(&self) -> MutexGuard<'_, Retained> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl OutputSink for MemorySink {
    fn write_line(&self, line: &str) -> io::Result<()> {
        let mut state = self.guard();
        if state.lines.len() == self.limit {
            state.lines.pop_front();
            state.dropped += 1;
        }
        state.lines.push_back(line.to_string());
        Ok(())
    }
}
