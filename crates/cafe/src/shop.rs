use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use brewline_core::Result;
use brewline_pipeline::{Pipeline, PipelineSettings, SchedulingStrategy, StageSpec, Task, WorkItem};

use crate::equipment::{beans_for_order, Brewer, Grinder};
use crate::metrics::ShopMetrics;

/// A customer order waiting to be served.
#[derive(Debug, Clone)]
pub struct Order {
    pub ounces_of_coffee_wanted: u32,
    /// When the order was taken.
    pub started_at: Instant,
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Order{{ouncesOfCoffeeWanted: {}}}", self.ounces_of_coffee_wanted)
    }
}

/// Takes orders and serves coffee produced by a grinder -> brewer pipeline.
pub struct CoffeeShop {
    id: String,
    pipeline: Pipeline,
    /// Brewed coffee not yet handed out, in ounces.
    ready_ounces: f64,
    pending: VecDeque<Order>,
    metrics: ShopMetrics,
}

impl CoffeeShop {
    pub fn new(
        grinders: Vec<Grinder>,
        brewers: Vec<Brewer>,
        strategy: SchedulingStrategy,
        settings: &PipelineSettings,
    ) -> Result<Self> {
        let id = format!("coffee-shop-{strategy}");
        let grinder_tasks = grinders
            .into_iter()
            .map(|g| Arc::new(g) as Arc<dyn Task>)
            .collect();
        let brewer_tasks = brewers
            .into_iter()
            .map(|b| Arc::new(b) as Arc<dyn Task>)
            .collect();

        let pipeline = Pipeline::new(
            id.clone(),
            vec![
                StageSpec::new("grinder", strategy, grinder_tasks),
                StageSpec::new("brewer", strategy, brewer_tasks),
            ],
            settings,
        )?;

        Ok(Self {
            id,
            pipeline,
            ready_ounces: 0.0,
            pending: VecDeque::new(),
            metrics: ShopMetrics::default(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn metrics(&self) -> &ShopMetrics {
        &self.metrics
    }

    pub fn metrics_mut(&mut self) -> &mut ShopMetrics {
        &mut self.metrics
    }

    /// Coffee brewed but not yet served, in ounces.
    pub fn reservoir(&self) -> f64 {
        self.ready_ounces
    }

    pub fn pending_orders(&self) -> usize {
        self.pending.len()
    }

    /// Record an order and send its beans into the pipeline.
    ///
    /// Blocks while the pipeline input is full.
    pub fn take_order(&mut self, ounces: u32) -> Result<()> {
        let order = Order {
            ounces_of_coffee_wanted: ounces,
            started_at: Instant::now(),
        };
        self.metrics.record_taken();

        let beans = WorkItem::new(beans_for_order(ounces));
        self.pipeline.push(beans)?;

        info!(shop = %self.id, order = %order, "took order");
        self.pending.push_back(order);
        Ok(())
    }

    /// Serve every pending order, oldest first.
    pub fn serve_coffee(&mut self) -> Result<()> {
        while self.serve_next()?.is_some() {}
        Ok(())
    }

    /// Serve the oldest pending order, if any.
    ///
    /// Brewed output accumulates in the reservoir until it covers the order;
    /// leftover coffee carries over to later orders, so an order already
    /// covered by the reservoir is served without waiting on the pipeline.
    pub fn serve_next(&mut self) -> Result<Option<Order>> {
        let Some(order) = self.pending.pop_front() else {
            return Ok(None);
        };
        let wanted = f64::from(order.ounces_of_coffee_wanted);
        while wanted > self.ready_ounces.floor() {
            let coffee = self.pipeline.pop()?;
            debug!(shop = %self.id, coffee = %coffee, "collected coffee");
            self.ready_ounces += coffee.amount;
        }
        self.ready_ounces -= wanted;

        self.metrics
            .record_served(order.ounces_of_coffee_wanted, order.started_at.elapsed());
        info!(
            shop = %self.id,
            order = %order,
            leftover_oz = self.ready_ounces,
            "served order"
        );
        Ok(Some(order))
    }
}

impl fmt::Debug for CoffeeShop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoffeeShop")
            .field("id", &self.id)
            .field("ready_ounces", &self.ready_ounces)
            .field("pending", &self.pending.len())
            .finish()
    }
}
