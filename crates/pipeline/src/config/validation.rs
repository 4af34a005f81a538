use brewline_core::{BrewlineError, Result};

use super::types::PipelineSettings;

impl PipelineSettings {
    /// Validate the settings: every capacity and the poll interval must be positive.
    pub fn validate(&self) -> Result<()> {
        let capacities = [
            ("pipeline_input_capacity", self.pipeline_input_capacity),
            ("pipeline_output_capacity", self.pipeline_output_capacity),
            ("worker_input_capacity", self.worker_input_capacity),
            ("pool_output_capacity", self.pool_output_capacity),
        ];
        for (name, value) in capacities {
            if value == 0 {
                return Err(BrewlineError::invalid(format!("{name} must be positive")));
            }
        }
        if self.scheduler_poll_interval_ms == 0 {
            return Err(BrewlineError::invalid(
                "scheduler_poll_interval_ms must be positive",
            ));
        }
        Ok(())
    }
}
