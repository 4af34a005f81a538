use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, warn};

use brewline_core::{BrewlineError, Result, WorkItem};

use crate::queue::Queue;
use crate::strategy::SchedulingStrategy;
use crate::worker::{IdleNotifier, Worker};

/// Pick the idle worker with the strictly greatest throughput.
///
/// Ties go to the lowest index. Returns `None` when every worker is busy.
pub fn select_fastest_available(workers: &[Arc<Worker>]) -> Option<usize> {
    let mut fastest: Option<(usize, u32)> = None;
    for (i, worker) in workers.iter().enumerate() {
        if worker.is_busy() {
            continue;
        }
        let throughput = worker.throughput();
        if fastest.map_or(true, |(_, best)| throughput > best) {
            fastest = Some((i, throughput));
        }
    }
    fastest.map(|(i, _)| i)
}

/// Routing loop of a push-strategy pool. Sole writer of every worker's
/// private input queue.
pub(super) struct Scheduler {
    pub(super) pool_id: String,
    pub(super) input: Queue<WorkItem>,
    pub(super) workers: Vec<Arc<Worker>>,
    pub(super) idle: Arc<IdleNotifier>,
    pub(super) poll: Duration,
}

impl Scheduler {
    pub(super) fn spawn(self, strategy: SchedulingStrategy) -> Result<JoinHandle<()>> {
        thread::Builder::new()
            .name(format!("{}:scheduler", self.pool_id))
            .spawn(move || self.run(strategy))
            .map_err(BrewlineError::Spawn)
    }

    fn run(&self, strategy: SchedulingStrategy) {
        let result = match strategy {
            SchedulingStrategy::PushRoundRobin => self.run_round_robin(),
            SchedulingStrategy::PushFastestAvailable => self.run_fastest_available(),
            SchedulingStrategy::Pull => Ok(()),
        };
        if let Err(e) = result {
            warn!(pool = %self.pool_id, error = %e, "scheduler exiting");
        }
    }

    /// Assign items in strict cyclic order, regardless of busy state.
    ///
    /// A full private queue blocks the scheduler instead of skipping the
    /// worker, so every later item waits behind it.
    fn run_round_robin(&self) -> Result<()> {
        let mut cursor = 0;
        loop {
            let item = self.input.pop()?;
            self.assign(cursor, item)?;
            cursor = (cursor + 1) % self.workers.len();
        }
    }

    /// Assign each item to the fastest idle worker, waiting while all are busy.
    fn run_fastest_available(&self) -> Result<()> {
        loop {
            let item = self.input.pop()?;
            let index = self
                .idle
                .wait_for(self.poll, || select_fastest_available(&self.workers));
            self.assign(index, item)?;
        }
    }

    fn assign(&self, index: usize, item: WorkItem) -> Result<()> {
        let worker = &self.workers[index];
        // Busy before the hand-off, so the worker can never be seen idle
        // while holding this item.
        worker.claim();
        debug!(pool = %self.pool_id, worker = %worker.id(), item = %item, "assigned");
        worker.input().push(item)
    }
}
