//! The loop each worker task runs.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, trace, warn};

use crate::models::WorkerSpec;

use super::cancel::CancelFlag;
use super::sink::OutputSink;

/// Emit `spec.pattern` to `sink` until `cancel` is set, then signal `done`.
///
/// The flag is checked before every emission, and each pacing delay ends
/// early when the flag is set.
pub async fn run_worker(
    spec: WorkerSpec,
    sink: Arc<dyn OutputSink>,
    cancel: Arc<CancelFlag>,
    done: watch::Sender<bool>,
) {
    let mut index: u64 = 0;

    while !cancel.is_cancelled() {
        let line = spec.pattern.emission(index);
        trace!(worker = spec.id, %line, "emit");

        if let Err(e) = sink.write_line(&line) {
            warn!(worker = spec.id, error = %e, "output sink rejected line, stopping worker");
            break;
        }
        index = index.wrapping_add(1);

        tokio::select! {
            () = tokio::time::sleep(spec.pace) => {}
            () = cancel.cancelled() => break,
        }
    }

    debug!(worker = spec.id, emitted = index, "worker stopped");
    // Release the sink before reporting, so a joined set holds no references.
    drop(sink);
    let _ = done.send(true);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PatternKind;
    use crate::runner::sink::MemorySink;
    use std::io;
    use std::time::Duration;

    struct BrokenSink;

    impl OutputSink for BrokenSink {
        fn write_line(&self, _line: &str) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
    }

    #[tokio::test]
    async fn test_worker_emits_in_pattern_order() {
        let sink = Arc::new(MemorySink::new());
        let cancel = Arc::new(CancelFlag::new());
        let (done_tx, mut done_rx) = watch::channel(false);

        let spec = WorkerSpec::new(1, PatternKind::Alphabet, Duration::from_millis(1));
        let task = tokio::spawn(run_worker(spec, sink.clone(), cancel.clone(), done_tx));

        while sink.len() < 30 {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        cancel.cancel();
        task.await.unwrap();
        assert!(*done_rx.borrow_and_update());

        let lines = sink.lines();
        for (i, line) in lines.iter().enumerate() {
            assert_eq!(*line, PatternKind::Alphabet.emission(i as u64));
        }
    }

    #[tokio::test]
    async fn test_cancelled_before_start_emits_nothing() {
        let sink = Arc::new(MemorySink::new());
        let cancel = Arc::new(CancelFlag::new());
        cancel.cancel();
        let (done_tx, done_rx) = watch::channel(false);

        let spec = WorkerSpec::new(1, PatternKind::Counter, Duration::from_millis(1));
        run_worker(spec, sink.clone(), cancel, done_tx).await;

        assert!(sink.is_empty());
        assert!(*done_rx.borrow());
    }

    #[tokio::test]
    async fn test_cancel_interrupts_long_pace() {
        let sink = Arc::new(MemorySink::new());
        let cancel = Arc::new(CancelFlag::new());
        let (done_tx, _done_rx) = watch::channel(false);

        let spec = WorkerSpec::new(3, PatternKind::Banner, Duration::from_secs(60));
        let task = tokio::spawn(run_worker(spec, sink.clone(), cancel.clone(), done_tx));

        tokio::time::sleep(Duration::from_millis(20)).await;
        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(sink.lines(), vec!["----"]);
    }

    #[tokio::test]
    async fn test_sink_failure_stops_worker() {
        let cancel = Arc::new(CancelFlag::new());
        let (done_tx, done_rx) = watch::channel(false);

        let spec = WorkerSpec::new(1, PatternKind::Counter, Duration::from_millis(1));
        tokio::time::timeout(
            Duration::from_secs(1),
            run_worker(spec, Arc::new(BrokenSink), cancel.clone(), done_tx),
        )
        .await
        .unwrap();

        assert!(*done_rx.borrow());
        assert!(!cancel.is_cancelled());
    }
}
