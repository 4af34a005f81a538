//! Multi-stage worker-pool pipeline.
//!
//! Bounded [`Queue`]s connect pools of concurrent [`Worker`]s. Each
//! [`WorkerPool`] routes incoming items to its workers with one of three
//! [`SchedulingStrategy`] variants, and a [`Pipeline`] chains pools into
//! sequential stages. Full queues block their producers; that blocking is the
//! only flow control.

pub mod config;
pub mod pipeline;
pub mod pool;
pub mod queue;
pub mod strategy;
pub mod task;
pub mod worker;

pub use brewline_core::{BrewlineError, ProcessingState, Result, WorkItem};
pub use config::PipelineSettings;
pub use pipeline::{Pipeline, StageSpec, StageStats};
pub use pool::{select_fastest_available, WorkerPool, WorkerStats};
pub use queue::Queue;
pub use strategy::SchedulingStrategy;
pub use task::{simulated_latency, FnTask, Task};
pub use worker::{IdleNotifier, Worker, WorkerIo};
