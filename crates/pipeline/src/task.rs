use std::fmt;
use std::time::Duration;

use brewline_core::WorkItem;

/// A unit of processing bound to one worker.
///
/// Implementations transform an item and may block for a duration that
/// depends on the item's amount and the task's throughput. They must
/// terminate and must only move `WorkItem::state` forward.
pub trait Task: Send + Sync {
    /// Human-readable name for logging.
    fn name(&self) -> &str;

    /// Work units processed per time unit. Must be positive.
    fn throughput(&self) -> u32;

    /// Transform the item. May block.
    fn process(&self, item: WorkItem) -> WorkItem;
}

/// Time needed to process `amount` units at `throughput` units per `unit`.
///
/// A zero throughput yields a zero duration; pools reject such tasks before
/// they can run. Latencies too long for a `Duration` saturate at
/// `Duration::MAX`.
pub fn simulated_latency(amount: f64, throughput: u32, unit: Duration) -> Duration {
    if throughput == 0 || amount <= 0.0 || !amount.is_finite() {
        return Duration::ZERO;
    }
    let secs = unit.as_secs_f64() * (amount / f64::from(throughput));
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}

type TaskFn = Box<dyn Fn(WorkItem) -> WorkItem + Send + Sync>;

/// Adapts a closure into a [`Task`].
pub struct FnTask {
    name: String,
    throughput: u32,
    f: TaskFn,
}

impl FnTask {
    pub fn new<F>(name: impl Into<String>, throughput: u32, f: F) -> Self
    where
        F: Fn(WorkItem) -> WorkItem + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            throughput,
            f: Box::new(f),
        }
    }
}

impl Task for FnTask {
    fn name(&self) -> &str {
        &self.name
    }

    fn throughput(&self) -> u32 {
        self.throughput
    }

    fn process(&self, item: WorkItem) -> WorkItem {
        (self.f)(item)
    }
}

impl fmt::Debug for FnTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnTask")
            .field("name", &self.name)
            .field("throughput", &self.throughput)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brewline_core::ProcessingState;

    #[test]
    fn latency_scales_with_amount_over_throughput() {
        let unit = Duration::from_secs(1);
        assert_eq!(simulated_latency(20.0, 10, unit), Duration::from_secs(2));
        assert_eq!(simulated_latency(20.0, 5, unit), Duration::from_secs(4));
        assert_eq!(
            simulated_latency(5.0, 10, Duration::from_millis(100)),
            Duration::from_millis(50)
        );
    }

    #[test]
    fn latency_degenerate_inputs() {
        let unit = Duration::from_secs(1);
        assert_eq!(simulated_latency(10.0, 0, unit), Duration::ZERO);
        assert_eq!(simulated_latency(0.0, 3, unit), Duration::ZERO);
        assert_eq!(simulated_latency(-1.0, 3, unit), Duration::ZERO);
        assert_eq!(simulated_latency(f64::NAN, 3, unit), Duration::ZERO);
        assert_eq!(simulated_latency(f64::INFINITY, 3, unit), Duration::ZERO);
    }

    #[test]
    fn latency_saturates_instead_of_overflowing() {
        assert_eq!(simulated_latency(1e20, 1, Duration::from_secs(1)), Duration::MAX);
        assert_eq!(simulated_latency(f64::MAX, 1, Duration::from_secs(u64::MAX)), Duration::MAX);
    }

    #[test]
    fn fn_task_applies_closure() {
        let task = FnTask::new("double", 4, |mut item: WorkItem| {
            item.amount *= 2.0;
            item.advance(ProcessingState::Stage(1));
            item
        });
        assert_eq!(task.name(), "double");
        assert_eq!(task.throughput(), 4);

        let out = task.process(WorkItem::new(1.5));
        assert_eq!(out.amount, 3.0);
        assert_eq!(out.state, ProcessingState::Stage(1));
    }
}
