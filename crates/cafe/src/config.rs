//! Coffee-shop simulation settings.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use brewline_core::{BrewlineError, Result};
use brewline_pipeline::PipelineSettings;

use crate::equipment::{Brewer, Grinder};

/// Equipment, workload, and pipeline sizing for one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopConfig {
    /// Grinder speeds in grams per second, one entry per grinder.
    #[serde(default = "default_grinders")]
    pub grinders: Vec<u32>,

    /// Brewer speeds in ounces of water per second, one entry per brewer.
    #[serde(default = "default_brewers")]
    pub brewers: Vec<u32>,

    #[serde(default = "default_customers")]
    pub customers: usize,

    #[serde(default = "default_ounces_per_order")]
    pub ounces_per_order: u32,

    /// Wall-clock milliseconds per simulated second.
    #[serde(default = "default_time_unit_ms")]
    pub time_unit_ms: u64,

    #[serde(default)]
    pub pipeline: PipelineSettings,
}

fn default_grinders() -> Vec<u32> {
    vec![5, 3, 12]
}

fn default_brewers() -> Vec<u32> {
    vec![100, 25]
}

fn default_customers() -> usize {
    10
}

fn default_ounces_per_order() -> u32 {
    12
}

fn default_time_unit_ms() -> u64 {
    1000
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            grinders: default_grinders(),
            brewers: default_brewers(),
            customers: default_customers(),
            ounces_per_order: default_ounces_per_order(),
            time_unit_ms: default_time_unit_ms(),
            pipeline: PipelineSettings::default(),
        }
    }
}

impl ShopConfig {
    /// Parse from TOML. Pipeline env overrides are applied before validation.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(toml_str)?;
        config.pipeline.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&content)
    }

    /// Check the workload fits the pipeline.
    ///
    /// Every order is taken before any is served, so the customer count may
    /// not exceed what the pipeline input and output queues can hold together.
    pub fn validate(&self) -> Result<()> {
        self.pipeline.validate()?;
        if self.grinders.is_empty() {
            return Err(BrewlineError::invalid("at least one grinder is required"));
        }
        if self.brewers.is_empty() {
            return Err(BrewlineError::invalid("at least one brewer is required"));
        }
        if self.grinders.iter().chain(&self.brewers).any(|&rate| rate == 0) {
            return Err(BrewlineError::invalid("equipment rates must be positive"));
        }
        if self.ounces_per_order == 0 {
            return Err(BrewlineError::invalid("ounces_per_order must be positive"));
        }
        if self.time_unit_ms == 0 {
            return Err(BrewlineError::invalid("time_unit_ms must be positive"));
        }
        let buffered =
            self.pipeline.pipeline_input_capacity + self.pipeline.pipeline_output_capacity;
        if self.customers > buffered {
            return Err(BrewlineError::invalid(format!(
                "{} customers exceed pipeline buffering of {buffered} orders",
                self.customers
            )));
        }
        Ok(())
    }

    pub fn time_unit(&self) -> Duration {
        Duration::from_millis(self.time_unit_ms)
    }

    pub fn build_grinders(&self) -> Vec<Grinder> {
        let unit = self.time_unit();
        self.grinders.iter().map(|&gps| Grinder::new(gps, unit)).collect()
    }

    pub fn build_brewers(&self) -> Vec<Brewer> {
        let unit = self.time_unit();
        self.brewers.iter().map(|&ows| Brewer::new(ows, unit)).collect()
    }
}
