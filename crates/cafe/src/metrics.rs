use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Counters and timings recorded by a coffee shop during one run.
#[derive(Debug, Clone, Default)]
pub struct ShopMetrics {
    /// Time from taking each order to serving it, in serving order.
    pub time_taken_per_order: Vec<Duration>,
    pub total_time_taken: Duration,
    pub orders_taken: u64,
    pub orders_served: u64,
    pub oz_coffee_served: f64,
}

impl ShopMetrics {
    pub fn record_taken(&mut self) {
        self.orders_taken += 1;
    }

    pub fn record_served(&mut self, ounces: u32, waited: Duration) {
        self.orders_served += 1;
        self.oz_coffee_served += f64::from(ounces);
        self.time_taken_per_order.push(waited);
    }

    /// Best / median / worst order latency plus totals.
    ///
    /// Returns `None` until at least one order has been served.
    pub fn summary(&self, shop: &str) -> Option<MetricsSummary> {
        let mut sorted = self.time_taken_per_order.clone();
        sorted.sort();
        let best = *sorted.first()?;
        let worst = *sorted.last()?;
        let median = sorted[sorted.len() / 2];

        Some(MetricsSummary {
            shop: shop.to_string(),
            generated_at: Utc::now(),
            best_ms: millis(best),
            median_ms: millis(median),
            worst_ms: millis(worst),
            total_ms: millis(self.total_time_taken),
            orders_taken: self.orders_taken,
            orders_served: self.orders_served,
            oz_coffee_served: self.oz_coffee_served,
        })
    }
}

fn millis(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Serializable report of one shop's run.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSummary {
    pub shop: String,
    pub generated_at: DateTime<Utc>,
    pub best_ms: f64,
    pub median_ms: f64,
    pub worst_ms: f64,
    pub total_ms: f64,
    pub orders_taken: u64,
    pub orders_served: u64,
    pub oz_coffee_served: f64,
}

impl fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "==================================")?;
        writeln!(f, "{} results", self.shop)?;
        writeln!(f, "==================================")?;
        writeln!(f, "Metrics{{")?;
        writeln!(f, "  bestDuration: {:.1}ms", self.best_ms)?;
        writeln!(f, "  medianDuration: {:.1}ms", self.median_ms)?;
        writeln!(f, "  worstDuration: {:.1}ms", self.worst_ms)?;
        writeln!(f, "  totalTimeTaken: {:.1}ms", self.total_ms)?;
        writeln!(f, "  ordersTaken: {}", self.orders_taken)?;
        writeln!(f, "  ordersServed: {}", self.orders_served)?;
        writeln!(f, "  ozCoffeeServed: {}", self.oz_coffee_served)?;
        write!(f, "}}")
    }
}
