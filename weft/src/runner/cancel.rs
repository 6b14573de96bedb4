//! Monotonic cancellation flag shared between the runner and one worker.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;

/// A boolean that can only go from `false` to `true`, with a wakeup for
/// tasks sleeping on it.
#[derive(Debug, Default)]
pub struct CancelFlag {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the flag and wake any waiter. Returns `true` if this call was the
    /// one that set it.
    pub fn cancel(&self) -> bool {
        let first = !self.cancelled.swap(true, Ordering::AcqRel);
        self.notify.notify_waiters();
        first
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Resolve once the flag is set.
    pub async fn cancelled(&self) {
        let notified = self.notify.notified();
        tokio::pin!(notified);
        // Register before checking so a cancel between the check and the
        // await is not lost.
        notified.as_mut().enable();
        if self.is_cancelled() {
            return;
        }
        notified.await;
    }
}
