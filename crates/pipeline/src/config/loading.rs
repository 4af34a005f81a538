use std::path::Path;

use brewline_core::config::{active_profile, profiled_env_parse};
use brewline_core::Result;

use super::types::PipelineSettings;

impl PipelineSettings {
    /// Parse settings from a TOML string, then apply env overrides and validate.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let mut settings: Self = toml::from_str(toml_str)?;
        settings.apply_env_overrides();
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a file path.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&content)
    }

    /// Defaults with env overrides applied.
    pub fn from_env() -> Result<Self> {
        let mut settings = Self::default();
        settings.apply_env_overrides();
        settings.validate()?;
        Ok(settings)
    }

    /// Apply environment variable overrides.
    ///
    /// Convention: `BREWLINE_<FIELD>` overrides `<field>`, and with
    /// `BREWLINE_PROFILE=STAGING` the key `STAGING_BREWLINE_<FIELD>` wins.
    /// Examples:
    /// - `BREWLINE_PIPELINE_INPUT_CAPACITY` -> `pipeline_input_capacity`
    /// - `BREWLINE_WORKER_INPUT_CAPACITY` -> `worker_input_capacity`
    /// - `BREWLINE_SCHEDULER_POLL_INTERVAL_MS` -> `scheduler_poll_interval_ms`
    pub fn apply_env_overrides(&mut self) {
        self.apply_profile_overrides(&active_profile());
    }

    /// Apply overrides for an explicit profile (empty = unprefixed keys only).
    pub fn apply_profile_overrides(&mut self, p: &str) {
        if let Some(v) = profiled_env_parse(p, "BREWLINE_PIPELINE_INPUT_CAPACITY") {
            self.pipeline_input_capacity = v;
        }
        if let Some(v) = profiled_env_parse(p, "BREWLINE_PIPELINE_OUTPUT_CAPACITY") {
            self.pipeline_output_capacity = v;
        }
        if let Some(v) = profiled_env_parse(p, "BREWLINE_WORKER_INPUT_CAPACITY") {
            self.worker_input_capacity = v;
        }
        if let Some(v) = profiled_env_parse(p, "BREWLINE_POOL_OUTPUT_CAPACITY") {
            self.pool_output_capacity = v;
        }
        if let Some(v) = profiled_env_parse(p, "BREWLINE_SCHEDULER_POLL_INTERVAL_MS") {
            self.scheduler_poll_interval_ms = v;
        }
    }
}
