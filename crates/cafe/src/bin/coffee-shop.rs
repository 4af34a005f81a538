//! coffee-shop — Runs the grinder -> brewer simulation under each scheduling strategy.
//!
//! Every selected strategy gets its own shop with identical equipment. All
//! orders are taken first, then served in arrival order, and the per-shop
//! metrics are printed at the end.
//!
//! # Usage
//!
//! ```bash
//! # Reference shop, all three strategies, one simulated second = 1s
//! coffee-shop
//!
//! # Faster run of a single strategy with JSON output
//! coffee-shop --strategy pull --time-unit-ms 10 --json
//!
//! # From a config file
//! BREWLINE_SHOP_CONFIG=shop.toml coffee-shop
//! ```

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use brewline_cafe::{CoffeeShop, MetricsSummary, ShopConfig};
use brewline_core::config::load_dotenv;
use brewline_pipeline::SchedulingStrategy;
use clap::Parser;

/// Coffee-shop pipeline simulation.
#[derive(Parser, Debug)]
#[command(name = "coffee-shop", version, about)]
struct Cli {
    /// TOML file with equipment, workload and `[pipeline]` settings.
    #[arg(long, env = "BREWLINE_SHOP_CONFIG")]
    config: Option<PathBuf>,

    /// Strategy to run: "all", "push-round-robin", "push-fastest" or "pull".
    #[arg(long, env = "BREWLINE_STRATEGY", default_value = "all")]
    strategy: String,

    /// Number of customers (overrides the config file).
    #[arg(long)]
    customers: Option<usize>,

    /// Ounces of coffee per order (overrides the config file).
    #[arg(long)]
    ounces: Option<u32>,

    /// Wall-clock milliseconds per simulated second (overrides the config file).
    #[arg(long)]
    time_unit_ms: Option<u64>,

    /// Print summaries as JSON instead of text blocks.
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn shop_config(&self) -> anyhow::Result<ShopConfig> {
        let mut config = match &self.config {
            Some(path) => ShopConfig::from_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => {
                let mut config = ShopConfig::default();
                config.pipeline.apply_env_overrides();
                config
            }
        };
        if let Some(customers) = self.customers {
            config.customers = customers;
        }
        if let Some(ounces) = self.ounces {
            config.ounces_per_order = ounces;
        }
        if let Some(ms) = self.time_unit_ms {
            config.time_unit_ms = ms;
        }
        config.validate()?;
        Ok(config)
    }

    fn strategies(&self) -> anyhow::Result<Vec<SchedulingStrategy>> {
        if self.strategy.eq_ignore_ascii_case("all") {
            return Ok(SchedulingStrategy::ALL.to_vec());
        }
        Ok(vec![self.strategy.parse()?])
    }
}

fn run_shop(config: &ShopConfig, strategy: SchedulingStrategy) -> anyhow::Result<MetricsSummary> {
    let mut shop = CoffeeShop::new(
        config.build_grinders(),
        config.build_brewers(),
        strategy,
        &config.pipeline,
    )?;
    tracing::info!(shop = %shop.id(), customers = config.customers, "opening shop");

    let start = Instant::now();
    for _ in 0..config.customers {
        shop.take_order(config.ounces_per_order)?;
    }
    shop.serve_coffee()?;
    shop.metrics_mut().total_time_taken = start.elapsed();

    tracing::info!(
        shop = %shop.id(),
        leftover_oz = shop.reservoir(),
        "shop closed"
    );
    shop.metrics()
        .summary(shop.id())
        .with_context(|| format!("{} served no orders", shop.id()))
}

fn main() -> anyhow::Result<()> {
    load_dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    tracing::info!(?cli, "starting coffee-shop");

    let config = cli.shop_config()?;
    let strategies = cli.strategies()?;

    let mut summaries = Vec::with_capacity(strategies.len());
    for strategy in strategies {
        summaries.push(run_shop(&config, strategy)?);
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
    } else {
        for summary in &summaries {
            println!("{summary}");
        }
    }
    Ok(())
}
