//! Coffee-shop simulation driving a two-stage brewline pipeline.
//!
//! Grinders and brewers are the task providers, the [`CoffeeShop`] takes
//! orders and serves coffee from a running reservoir, and [`ShopMetrics`]
//! summarizes each run.

pub mod config;
pub mod equipment;
pub mod metrics;
pub mod shop;

pub use config::ShopConfig;
pub use equipment::{
    beans_for_order, Brewer, Grinder, GRAMS_BEANS_PER_OUNCE_COFFEE, GRAMS_BEANS_PER_OUNCE_WATER,
};
pub use metrics::{MetricsSummary, ShopMetrics};
pub use shop::{CoffeeShop, Order};
