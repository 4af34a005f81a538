use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use brewline_core::BrewlineError;

/// How a pool routes incoming items to its workers. Fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SchedulingStrategy {
    /// Scheduler assigns items to workers in strict cyclic order.
    #[serde(rename = "push-round-robin")]
    PushRoundRobin,
    /// Scheduler assigns each item to the idle worker with the highest throughput.
    #[serde(rename = "push-fastest")]
    PushFastestAvailable,
    /// Workers compete for items on the pool's shared input queue.
    #[serde(rename = "pull")]
    Pull,
}

impl SchedulingStrategy {
    pub const ALL: [SchedulingStrategy; 3] = [
        SchedulingStrategy::PushRoundRobin,
        SchedulingStrategy::PushFastestAvailable,
        SchedulingStrategy::Pull,
    ];

    /// Whether the pool runs its own scheduler thread.
    pub fn is_push(self) -> bool {
        !matches!(self, SchedulingStrategy::Pull)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SchedulingStrategy::PushRoundRobin => "push-round-robin",
            SchedulingStrategy::PushFastestAvailable => "push-fastest",
            SchedulingStrategy::Pull => "pull",
        }
    }
}

impl fmt::Display for SchedulingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchedulingStrategy {
    type Err = BrewlineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "push-round-robin" | "round-robin" => Ok(SchedulingStrategy::PushRoundRobin),
            "push-fastest" | "fastest" => Ok(SchedulingStrategy::PushFastestAvailable),
            "pull" => Ok(SchedulingStrategy::Pull),
            other => Err(BrewlineError::invalid(format!(
                "unknown scheduling strategy '{other}', expected 'push-round-robin', 'push-fastest' or 'pull'"
            ))),
        }
    }
}
