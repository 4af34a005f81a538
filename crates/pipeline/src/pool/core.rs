use std::sync::Arc;
use std::thread::JoinHandle;

use serde::Serialize;
use tracing::info;

use brewline_core::{BrewlineError, Result, WorkItem};

use crate::config::PipelineSettings;
use crate::queue::Queue;
use crate::strategy::SchedulingStrategy;
use crate::task::Task;
use crate::worker::{IdleNotifier, Worker, WorkerIo};

use super::scheduling::Scheduler;

/// A set of workers sharing one logical input and one logical output queue.
///
/// Push strategies give every worker a private input queue that only the
/// pool's scheduler thread writes to. Under [`SchedulingStrategy::Pull`] every
/// worker pops straight from the pool input and no scheduler thread exists.
pub struct WorkerPool {
    id: String,
    io: WorkerIo,
    workers: Vec<Arc<Worker>>,
    strategy: SchedulingStrategy,
    /// Worker threads, then the scheduler thread (push strategies).
    handles: Vec<JoinHandle<()>>,
}

/// Point-in-time view of one worker, for metrics and logging.
#[derive(Debug, Clone, Serialize)]
pub struct WorkerStats {
    pub id: String,
    pub task: String,
    pub throughput: u32,
    pub busy: bool,
    pub in_flight: usize,
    pub processed: u64,
}

impl WorkerPool {
    /// Check a pool definition without creating anything.
    pub fn validate(id: &str, tasks: &[Arc<dyn Task>]) -> Result<()> {
        if tasks.is_empty() {
            return Err(BrewlineError::invalid(format!("worker pool '{id}' has no workers")));
        }
        for (i, task) in tasks.iter().enumerate() {
            if task.throughput() == 0 {
                return Err(BrewlineError::invalid(format!(
                    "worker {id}[{i}] (task '{}') has non-positive throughput",
                    task.name()
                )));
            }
        }
        Ok(())
    }

    /// Build the pool and start its threads: one per worker, plus a scheduler
    /// for push strategies.
    ///
    /// All validation and queue allocation happens before the first thread
    /// starts, so an error never leaves a partially running pool behind.
    pub fn spawn(
        id: impl Into<String>,
        io: WorkerIo,
        tasks: Vec<Arc<dyn Task>>,
        strategy: SchedulingStrategy,
        settings: &PipelineSettings,
    ) -> Result<Self> {
        let id = id.into();
        Self::validate(&id, &tasks)?;
        settings.validate()?;

        let idle = Arc::new(IdleNotifier::new());
        let mut workers = Vec::with_capacity(tasks.len());
        for (i, task) in tasks.into_iter().enumerate() {
            let input = if strategy.is_push() {
                Queue::bounded(settings.worker_input_capacity)?
            } else {
                io.input.clone()
            };
            let worker_io = WorkerIo {
                input,
                output: io.output.clone(),
            };
            let worker = Worker::new(
                format!("{id}[{i}]"),
                worker_io,
                task,
                !strategy.is_push(),
                Arc::clone(&idle),
            )?;
            workers.push(Arc::new(worker));
        }

        let mut handles = Vec::with_capacity(workers.len() + 1);
        for worker in &workers {
            handles.push(worker.spawn()?);
        }

        if strategy.is_push() {
            let scheduler = Scheduler {
                pool_id: id.clone(),
                input: io.input.clone(),
                workers: workers.clone(),
                idle,
                poll: settings.scheduler_poll_interval(),
            };
            handles.push(scheduler.spawn(strategy)?);
        }

        info!(
            pool = %id,
            workers = workers.len(),
            strategy = %strategy,
            "worker pool started"
        );

        Ok(Self {
            id,
            io,
            workers,
            strategy,
            handles,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn strategy(&self) -> SchedulingStrategy {
        self.strategy
    }

    pub fn input(&self) -> &Queue<WorkItem> {
        &self.io.input
    }

    pub fn output(&self) -> &Queue<WorkItem> {
        &self.io.output
    }

    pub fn workers(&self) -> &[Arc<Worker>] {
        &self.workers
    }

    /// Number of threads this pool started.
    pub fn thread_count(&self) -> usize {
        self.handles.len()
    }

    /// Snapshot every worker's busy state and counters.
    pub fn stats(&self) -> Vec<WorkerStats> {
        self.workers
            .iter()
            .map(|w| WorkerStats {
                id: w.id().to_string(),
                task: w.task_name().to_string(),
                throughput: w.throughput(),
                busy: w.is_busy(),
                in_flight: w.in_flight(),
                processed: w.processed(),
            })
            .collect()
    }

    /// Total items this pool has pushed downstream.
    pub fn processed(&self) -> u64 {
        self.workers.iter().map(|w| w.processed()).sum()
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("id", &self.id)
            .field("strategy", &self.strategy)
            .field("workers", &self.workers)
            .finish()
    }
}
