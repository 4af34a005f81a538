//! A single worker: pops items from its input, runs its task, pushes results.
//!
//! Busy tracking is an in-flight counter. A push-strategy scheduler claims the
//! worker before handing it an item; the worker releases the claim only after
//! the result has been pushed downstream. Under the pull strategy the worker
//! claims itself right after its own pop.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, warn};

use brewline_core::{BrewlineError, Result, WorkItem};

use crate::queue::Queue;
use crate::task::Task;

/// Wakes a waiting scheduler whenever a worker in its pool goes idle.
#[derive(Debug, Default)]
pub struct IdleNotifier {
    lock: Mutex<()>,
    cvar: Condvar,
}

impl IdleNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wake every waiter.
    pub fn notify(&self) {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.cvar.notify_all();
    }

    /// Block until `check` yields a value.
    ///
    /// `check` runs under the notifier lock, so a `notify` issued after a
    /// failed check cannot be missed. `poll` bounds each wait as a fallback.
    pub fn wait_for<T>(&self, poll: Duration, mut check: impl FnMut() -> Option<T>) -> T {
        let mut guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            if let Some(found) = check() {
                return found;
            }
            guard = self
                .cvar
                .wait_timeout(guard, poll)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }
}

/// Input and output queue handles of a worker or pool.
#[derive(Debug, Clone)]
pub struct WorkerIo {
    pub input: Queue<WorkItem>,
    pub output: Queue<WorkItem>,
}

/// Runs one [`Task`] on its own thread for the lifetime of the process.
pub struct Worker {
    id: String,
    io: WorkerIo,
    task: Arc<dyn Task>,
    in_flight: AtomicUsize,
    processed: AtomicU64,
    /// Set for pull-strategy workers, which have no scheduler to claim them.
    self_claim: bool,
    idle: Arc<IdleNotifier>,
}

impl Worker {
    /// Create a worker. Fails if the task declares a zero throughput.
    pub fn new(
        id: impl Into<String>,
        io: WorkerIo,
        task: Arc<dyn Task>,
        self_claim: bool,
        idle: Arc<IdleNotifier>,
    ) -> Result<Self> {
        let id = id.into();
        if task.throughput() == 0 {
            return Err(BrewlineError::invalid(format!(
                "worker '{id}' (task '{}') has non-positive throughput",
                task.name()
            )));
        }
        Ok(Self {
            id,
            io,
            task,
            in_flight: AtomicUsize::new(0),
            processed: AtomicU64::new(0),
            self_claim,
            idle,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn throughput(&self) -> u32 {
        self.task.throughput()
    }

    pub fn task_name(&self) -> &str {
        self.task.name()
    }

    pub fn input(&self) -> &Queue<WorkItem> {
        &self.io.input
    }

    /// True while the worker holds or has been assigned an unfinished item.
    pub fn is_busy(&self) -> bool {
        self.in_flight() > 0
    }

    /// Items assigned to this worker whose results have not been pushed yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Items this worker has finished and pushed downstream.
    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::SeqCst)
    }

    /// Mark the worker busy with one more item.
    pub(crate) fn claim(&self) {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
    }

    fn release(&self) {
        let prev = self.in_flight.fetch_sub(1, Ordering::SeqCst);
        debug_assert!(prev > 0, "worker released without a claim");
        if prev == 1 {
            self.idle.notify();
        }
    }

    /// Start [`Worker::run`] on a dedicated named thread.
    pub fn spawn(self: &Arc<Self>) -> Result<JoinHandle<()>> {
        let worker = Arc::clone(self);
        thread::Builder::new()
            .name(self.id.clone())
            .spawn(move || worker.run())
            .map_err(BrewlineError::Spawn)
    }

    /// Worker loop. Returns only if one of its queues has been closed.
    pub fn run(&self) {
        loop {
            let item = match self.io.input.pop() {
                Ok(item) => item,
                Err(e) => {
                    warn!(worker = %self.id, error = %e, "input closed, worker exiting");
                    return;
                }
            };
            if self.self_claim {
                self.claim();
            }
            debug!(worker = %self.id, item = %item, "received");

            let result = self.process(item);
            debug!(worker = %self.id, item = %result, "processed");

            if let Err(e) = self.io.output.push(result) {
                warn!(worker = %self.id, error = %e, "output closed, worker exiting");
                return;
            }
            self.processed.fetch_add(1, Ordering::SeqCst);
            self.release();
        }
    }

    fn process(&self, item: WorkItem) -> WorkItem {
        let before = item.state;
        let mut result = self.task.process(item);
        if result.state < before {
            warn!(
                worker = %self.id,
                task = self.task.name(),
                from = %before,
                to = %result.state,
                "task moved item state backwards"
            );
        }
        result.record_handler(&self.id);
        result
    }
}

impl std::fmt::Debug for Worker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Worker")
            .field("id", &self.id)
            .field("throughput", &self.throughput())
            .field("in_flight", &self.in_flight())
            .field("processed", &self.processed())
            .finish()
    }
}
