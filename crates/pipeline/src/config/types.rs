use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Capacities of every queue a pipeline creates, plus scheduler tuning.
///
/// Capacities are fixed once the queues exist; changing settings never
/// resizes a running pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineSettings {
    /// Capacity of the pipeline's input queue (stage 0 input).
    #[serde(default = "default_pipeline_input_capacity")]
    pub pipeline_input_capacity: usize,

    /// Capacity of the pipeline's output queue (last stage output).
    #[serde(default = "default_pipeline_output_capacity")]
    pub pipeline_output_capacity: usize,

    /// Capacity of each worker's private queue under push strategies.
    #[serde(default = "default_worker_input_capacity")]
    pub worker_input_capacity: usize,

    /// Capacity of the queues between stages.
    #[serde(default = "default_pool_output_capacity")]
    pub pool_output_capacity: usize,

    /// Fallback re-check interval while no worker is idle (fastest-available).
    #[serde(default = "default_scheduler_poll_interval_ms")]
    pub scheduler_poll_interval_ms: u64,
}

fn default_pipeline_input_capacity() -> usize {
    100
}

fn default_pipeline_output_capacity() -> usize {
    100
}

fn default_worker_input_capacity() -> usize {
    10
}

fn default_pool_output_capacity() -> usize {
    100
}

fn default_scheduler_poll_interval_ms() -> u64 {
    10
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            pipeline_input_capacity: default_pipeline_input_capacity(),
            pipeline_output_capacity: default_pipeline_output_capacity(),
            worker_input_capacity: default_worker_input_capacity(),
            pool_output_capacity: default_pool_output_capacity(),
            scheduler_poll_interval_ms: default_scheduler_poll_interval_ms(),
        }
    }
}

impl PipelineSettings {
    pub fn scheduler_poll_interval(&self) -> Duration {
        Duration::from_millis(self.scheduler_poll_interval_ms)
    }
}
