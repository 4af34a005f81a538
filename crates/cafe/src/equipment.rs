use std::thread;
use std::time::Duration;

use brewline_pipeline::{simulated_latency, ProcessingState, Task, WorkItem};

/// Grams of beans needed per ounce of brewed coffee.
pub const GRAMS_BEANS_PER_OUNCE_COFFEE: u32 = 2;

/// Ounces of water brewed per gram of ground beans.
pub const GRAMS_BEANS_PER_OUNCE_WATER: f64 = 0.5;

/// Grams of beans needed to brew an order of `ounces`.
pub fn beans_for_order(ounces: u32) -> f64 {
    f64::from(GRAMS_BEANS_PER_OUNCE_COFFEE) * f64::from(ounces)
}

/// Beans have been ground (first stage).
pub const GROUND: ProcessingState = ProcessingState::Stage(1);

/// Beans have been brewed into coffee (second stage).
pub const BREWED: ProcessingState = ProcessingState::Stage(2);

/// Grinds beans at a fixed rate. Amounts are grams.
#[derive(Debug, Clone)]
pub struct Grinder {
    pub grams_per_second: u32,
    /// Wall-clock length of one simulated second.
    pub time_unit: Duration,
}

impl Grinder {
    pub fn new(grams_per_second: u32, time_unit: Duration) -> Self {
        Self {
            grams_per_second,
            time_unit,
        }
    }
}

impl Task for Grinder {
    fn name(&self) -> &str {
        "grinder"
    }

    fn throughput(&self) -> u32 {
        self.grams_per_second
    }

    fn process(&self, mut beans: WorkItem) -> WorkItem {
        thread::sleep(simulated_latency(
            beans.amount,
            self.grams_per_second,
            self.time_unit,
        ));
        beans.advance(GROUND);
        beans
    }
}

/// Brews ground beans into coffee. Turns grams of beans into ounces of coffee.
#[derive(Debug, Clone)]
pub struct Brewer {
    pub ounces_water_per_second: u32,
    pub time_unit: Duration,
}

impl Brewer {
    pub fn new(ounces_water_per_second: u32, time_unit: Duration) -> Self {
        Self {
            ounces_water_per_second,
            time_unit,
        }
    }
}

impl Task for Brewer {
    fn name(&self) -> &str {
        "brewer"
    }

    fn throughput(&self) -> u32 {
        self.ounces_water_per_second
    }

    fn process(&self, mut beans: WorkItem) -> WorkItem {
        let water = beans.amount * GRAMS_BEANS_PER_OUNCE_WATER;
        thread::sleep(simulated_latency(
            water,
            self.ounces_water_per_second,
            self.time_unit,
        ));
        beans.amount = water;
        beans.advance(BREWED);
        beans
    }
}
