//! Starting, cancelling and joining sets of workers.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::RunnerError;
use crate::models::{WorkerId, WorkerSpec};

use super::cancel::CancelFlag;
use super::sink::{LineSink, OutputSink};
use super::worker::run_worker;

/// Identifier of a running set.
pub type RunId = Uuid;

/// Token for the workers launched by one [`WorkerRunner::start`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunningSet {
    id: RunId,
    workers: Vec<WorkerId>,
    parallel: bool,
}

impl RunningSet {
    pub const fn id(&self) -> RunId {
        self.id
    }

    /// Worker ids in start order.
    pub fn worker_ids(&self) -> &[WorkerId] {
        &self.workers
    }

    /// Whether the workers were scheduled on a multi-threaded runtime. When
    /// false they share one thread and only interleave at their pacing delays.
    pub const fn runs_in_parallel(&self) -> bool {
        self.parallel
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }
}

/// Outcome of [`WorkerRunner::join`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinResult {
    /// Every worker exited its loop.
    AllCompleted,
    /// The timeout elapsed first; these workers are still running.
    TimedOut(Vec<WorkerId>),
}

/// Runtime state of one started worker.
#[derive(Debug)]
struct WorkerHandle {
    spec: WorkerSpec,
    cancel: Arc<CancelFlag>,
    done: watch::Receiver<bool>,
    task: JoinHandle<()>,
}

impl WorkerHandle {
    fn has_exited(&self) -> bool {
        *self.done.borrow() || self.task.is_finished()
    }

    async fn exited(&self) {
        let mut done = self.done.clone();
        // A dropped sender means the task is gone, which counts as exited.
        let _ = done.wait_for(|exited| *exited).await;
    }
}

/// Starts fixed sets of repeating workers and waits for or cancels them.
///
/// Workers are Tokio tasks, so `start` must be called from within a runtime.
/// Use the multi-threaded runtime for workers to make progress in parallel.
///
/// # Example
///
/// ```rust,no_run
/// use std::time::Duration;
/// use weft::models::WorkerSpec;
/// use weft::runner::{JoinResult, WorkerRunner};
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let runner = WorkerRunner::stdout();
///     let running = runner.start(WorkerSpec::defaults())?;
///
///     tokio::time::sleep(Duration::from_secs(2)).await;
///     runner.cancel(&running)?;
///
///     let result = runner.join(&running, Some(Duration::from_secs(1))).await?;
///     assert_eq!(result, JoinResult::AllCompleted);
///     Ok(())
/// }
/// ```
pub struct WorkerRunner {
    sink: Arc<dyn OutputSink>,
    sets: Mutex<HashMap<RunId, Arc<[WorkerHandle]>>>,
}

impl WorkerRunner {
    /// Create a runner whose workers write to `sink`.
    pub fn new(sink: Arc<dyn OutputSink>) -> Self {
        Self {
            sink,
            sets: Mutex::new(HashMap::new()),
        }
    }

    /// Create a runner whose workers write to standard output.
    pub fn stdout() -> Self {
        Self::new(Arc::new(LineSink::stdout()))
    }

    /// Launch one worker per spec and return without waiting.
    ///
    /// Specs are validated before anything is spawned: an empty list,
    /// duplicate ids or a zero pace fail with [`RunnerError::InvalidSpec`]
    /// and no worker runs.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime. Workers only run in
    /// parallel on the multi-threaded runtime; on a current-thread runtime
    /// they are multiplexed on the calling thread and each blocking sink write
    /// holds up the others. [`RunningSet::runs_in_parallel`] reports which.
    pub fn start(
        &self,
        specs: impl IntoIterator<Item = WorkerSpec>,
    ) -> Result<RunningSet, RunnerError> {
        let specs: Vec<WorkerSpec> = specs.into_iter().collect();
        validate(&specs)?;

        let parallel = Handle::current().runtime_flavor() == RuntimeFlavor::MultiThread;
        if !parallel {
            warn!("current-thread runtime: workers will not run in parallel");
        }

        let id = Uuid::now_v7();
        let handles: Arc<[WorkerHandle]> = specs
            .iter()
            .map(|&spec| {
                let cancel = Arc::new(CancelFlag::new());
                let (done_tx, done_rx) = watch::channel(false);
                let task = tokio::spawn(run_worker(
                    spec,
                    Arc::clone(&self.sink),
                    Arc::clone(&cancel),
                    done_tx,
                ));
                debug!(
                    run = %id,
                    worker = spec.id,
                    pattern = %spec.pattern,
                    pace = ?spec.pace,
                    "worker started"
                );
                WorkerHandle {
                    spec,
                    cancel,
                    done: done_rx,
                    task,
                }
            })
            .collect();

        self.lock().insert(id, handles);
        info!(run = %id, workers = specs.len(), "running set started");

        Ok(RunningSet {
            id,
            workers: specs.iter().map(|s| s.id).collect(),
            parallel,
        })
    }

    /// Ask every worker in the set to stop. Does not wait; see [`Self::join`].
    pub fn cancel(&self, running: &RunningSet) -> Result<(), RunnerError> {
        let handles = self.handles(running)?;
        let newly = handles.iter().filter(|h| h.cancel.cancel()).count();
        debug!(run = %running.id, newly_cancelled = newly, "cancel requested");
        Ok(())
    }

    /// Wait for every worker in the set to exit, or until `timeout` elapses.
    ///
    /// With no timeout and no prior [`Self::cancel`], this never returns:
    /// workers only stop when cancelled.
    ///
    /// On [`JoinResult::AllCompleted`] the set is released and further calls
    /// with it fail with [`RunnerError::UnknownHandle`]. On
    /// [`JoinResult::TimedOut`] the workers keep running and the set stays
    /// valid.
    pub async fn join(
        &self,
        running: &RunningSet,
        timeout: Option<Duration>,
    ) -> Result<JoinResult, RunnerError> {
        let handles = self.handles(running)?;

        let all_exited = async {
            for handle in handles.iter() {
                handle.exited().await;
            }
        };

        let finished = match timeout {
            Some(limit) => tokio::time::timeout(limit, all_exited).await.is_ok(),
            None => {
                all_exited.await;
                true
            }
        };

        let still_running: Vec<WorkerId> = if finished {
            Vec::new()
        } else {
            handles
                .iter()
                .filter(|h| !h.has_exited())
                .map(|h| h.spec.id)
                .collect()
        };

        if still_running.is_empty() {
            self.lock().remove(&running.id);
            debug!(run = %running.id, "running set joined");
            Ok(JoinResult::AllCompleted)
        } else {
            debug!(run = %running.id, ?still_running, "join timed out");
            Ok(JoinResult::TimedOut(still_running))
        }
    }

    /// Number of running sets not yet fully joined.
    pub fn running_sets(&self) -> usize {
        self.lock().len()
    }

    fn handles(&self, running: &RunningSet) -> Result<Arc<[WorkerHandle]>, RunnerError> {
        self.lock()
            .get(&running.id)
            .cloned()
            .ok_or(RunnerError::UnknownHandle(running.id))
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<RunId, Arc<[WorkerHandle]>>> {
        self.sets.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for WorkerRunner {
    fn drop(&mut self) {
        for handles in self.lock().values() {
            for handle in handles.iter() {
                handle.cancel.cancel();
            }
        }
    }
}

fn validate(specs: &[WorkerSpec]) -> Result<(), RunnerError> {
    if specs.is_empty() {
        return Err(RunnerError::InvalidSpec("no workers given".to_string()));
    }

    let mut seen = HashSet::with_capacity(specs.len());
    for spec in specs {
        if !seen.insert(spec.id) {
            return Err(RunnerError::InvalidSpec(format!("duplicate worker id {}", spec.id)));
        }
        if spec.pace.is_zero() {
            return Err(RunnerError::InvalidSpec(format!(
                "worker {} has a zero pace",
                spec.id
            )));
        }
    }

    Ok(())
}
