//! Sequential composition of worker pools.
//!
//! Stage *i*'s output queue is the very same queue as stage *i+1*'s input.
//! The pipeline itself transforms nothing: it only wires stages together and
//! owns them for their lifetime.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use brewline_core::{BrewlineError, Result, WorkItem};

use crate::config::PipelineSettings;
use crate::pool::{WorkerPool, WorkerStats};
use crate::queue::Queue;
use crate::strategy::SchedulingStrategy;
use crate::task::Task;
use crate::worker::WorkerIo;

/// Definition of one stage: its workers' tasks and how items are routed to them.
pub struct StageSpec {
    pub name: String,
    pub strategy: SchedulingStrategy,
    pub tasks: Vec<Arc<dyn Task>>,
}

impl StageSpec {
    pub fn new(
        name: impl Into<String>,
        strategy: SchedulingStrategy,
        tasks: Vec<Arc<dyn Task>>,
    ) -> Self {
        Self {
            name: name.into(),
            strategy,
            tasks,
        }
    }
}

/// Per-stage snapshot returned by [`Pipeline::stats`].
#[derive(Debug, Clone, Serialize)]
pub struct StageStats {
    pub pool: String,
    pub strategy: SchedulingStrategy,
    pub queued: usize,
    pub workers: Vec<WorkerStats>,
}

/// An ordered chain of worker pools.
pub struct Pipeline {
    id: String,
    io: WorkerIo,
    stages: Vec<WorkerPool>,
}

impl Pipeline {
    /// Validate every stage, then wire and start them in order.
    ///
    /// Nothing is started unless the whole definition is valid.
    pub fn new(
        id: impl Into<String>,
        stages: Vec<StageSpec>,
        settings: &PipelineSettings,
    ) -> Result<Self> {
        let id = id.into();
        Self::validate(&id, &stages, settings)?;

        let input = Queue::bounded(settings.pipeline_input_capacity)?;
        let output = Queue::bounded(settings.pipeline_output_capacity)?;

        // Allocate every inter-stage queue up front.
        let last = stages.len() - 1;
        let mut ios = Vec::with_capacity(stages.len());
        let mut upstream = input.clone();
        for i in 0..stages.len() {
            let downstream = if i == last {
                output.clone()
            } else {
                Queue::bounded(settings.pool_output_capacity)?
            };
            ios.push(WorkerIo {
                input: upstream,
                output: downstream.clone(),
            });
            upstream = downstream;
        }

        let mut pools = Vec::with_capacity(stages.len());
        for (spec, io) in stages.into_iter().zip(ios) {
            let pool = WorkerPool::spawn(
                format!("{id}:{}", spec.name),
                io,
                spec.tasks,
                spec.strategy,
                settings,
            )?;
            pools.push(pool);
        }

        info!(pipeline = %id, stages = pools.len(), "pipeline started");

        Ok(Self {
            id,
            io: WorkerIo { input, output },
            stages: pools,
        })
    }

    /// Build a pipeline whose stages all share one strategy.
    ///
    /// Stages are named `stage-0`, `stage-1`, ...
    pub fn uniform(
        id: impl Into<String>,
        strategy: SchedulingStrategy,
        stage_tasks: Vec<Vec<Arc<dyn Task>>>,
        settings: &PipelineSettings,
    ) -> Result<Self> {
        let stages = stage_tasks
            .into_iter()
            .enumerate()
            .map(|(i, tasks)| StageSpec::new(format!("stage-{i}"), strategy, tasks))
            .collect();
        Self::new(id, stages, settings)
    }

    /// Check a pipeline definition without creating any queue or thread.
    pub fn validate(id: &str, stages: &[StageSpec], settings: &PipelineSettings) -> Result<()> {
        settings.validate()?;
        if stages.is_empty() {
            return Err(BrewlineError::invalid(format!("pipeline '{id}' has no stages")));
        }
        let mut names = HashSet::new();
        for stage in stages {
            if !names.insert(stage.name.as_str()) {
                return Err(BrewlineError::invalid(format!(
                    "pipeline '{id}' has duplicate stage '{}'",
                    stage.name
                )));
            }
            WorkerPool::validate(&format!("{id}:{}", stage.name), &stage.tasks)?;
        }
        Ok(())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Queue accepting new items (stage 0 input).
    pub fn input(&self) -> &Queue<WorkItem> {
        &self.io.input
    }

    /// Queue yielding finished items (last stage output).
    pub fn output(&self) -> &Queue<WorkItem> {
        &self.io.output
    }

    pub fn stages(&self) -> &[WorkerPool] {
        &self.stages
    }

    /// Push an item into the first stage, blocking while the input is full.
    pub fn push(&self, item: WorkItem) -> Result<()> {
        self.io.input.push(item)
    }

    /// Pop a finished item, blocking until one is available.
    pub fn pop(&self) -> Result<WorkItem> {
        self.io.output.pop()
    }

    pub fn stats(&self) -> Vec<StageStats> {
        self.stages
            .iter()
            .map(|pool| StageStats {
                pool: pool.id().to_string(),
                strategy: pool.strategy(),
                queued: pool.input().len(),
                workers: pool.stats(),
            })
            .collect()
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("id", &self.id)
            .field("stages", &self.stages)
            .finish()
    }
}
