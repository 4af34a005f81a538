use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique work item identifier.
pub type ItemId = Uuid;

/// How far an item has travelled through the stages of a pipeline.
///
/// Ordered: `Unprocessed < Stage(1) < Stage(2) < ...`. Tasks only ever move
/// an item forward.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum ProcessingState {
    #[default]
    Unprocessed,
    /// Completed the given (1-based) stage.
    Stage(u32),
}

impl ProcessingState {
    /// Number of completed stages.
    pub fn completed_stages(self) -> u32 {
        match self {
            ProcessingState::Unprocessed => 0,
            ProcessingState::Stage(n) => n,
        }
    }
}

impl fmt::Display for ProcessingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessingState::Unprocessed => write!(f, "unprocessed"),
            ProcessingState::Stage(n) => write!(f, "stage-{n}"),
        }
    }
}

/// A unit of work handed from queue to queue.
///
/// Owned by exactly one queue or one worker at a time; never shared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItem {
    pub id: ItemId,
    pub amount: f64,
    pub state: ProcessingState,
    /// Ids of the workers that processed this item, oldest first.
    #[serde(default)]
    pub route: Vec<String>,
}

impl WorkItem {
    pub fn new(amount: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            amount,
            state: ProcessingState::Unprocessed,
            route: Vec::new(),
        }
    }

    /// Move the item to `state`. Moving backwards is ignored.
    pub fn advance(&mut self, state: ProcessingState) {
        if state > self.state {
            self.state = state;
        }
    }

    /// Append a worker id to the route.
    pub fn record_handler(&mut self, worker_id: &str) {
        self.route.push(worker_id.to_string());
    }

    /// Id of the worker that processed the item most recently.
    pub fn last_handler(&self) -> Option<&str> {
        self.route.last().map(|s| s.as_str())
    }
}

impl fmt::Display for WorkItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WorkItem{{amount: {:.1}, state: {}}}", self.amount, self.state)
    }
}
