//! # System Supervisor
//!
//! The orchestration layer: wires the queue, the worker pool, and the
//! payment pool together at startup, and coordinates their teardown.
//!
//! ## Shutdown Protocol
//!
//! [`OrderSystem::shutdown`] consumes the system and runs four steps in
//! order:
//!
//! 1. Close the queue, so blocked and future dequeues see the end-of-work
//!    sentinel and blocked producers fail fast instead of hanging.
//! 2. Cancel the worker stop token; workers racing it at their loop head
//!    and inside blocking waits exit promptly.
//! 3. Join every worker under a bounded timeout; a worker that misses the
//!    bound is left detached and counted, never force-killed.
//! 4. Shut the payment pool down, cancelling outstanding charge and refund
//!    tasks.
//!
//! Because the stop token fires right after the queue closes, orders still
//! buffered at that moment are not processed; the [`ShutdownReport`] names
//! them instead of silently dropping them.

use crate::catalog::ProductCatalog;
use crate::config::PipelineConfig;
use crate::intake::OrderIntake;
use crate::inventory::Inventory;
use crate::model::Order;
use crate::payment::{PaymentGateway, PaymentProcessor};
use crate::worker::OrderWorker;
use pipeline_core::{TaskPool, WorkQueue};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// What [`OrderSystem::shutdown`] observed on the way down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Orders still buffered when the workers stopped. They were never
    /// dequeued; their receipts stay on the last pre-terminal status.
    pub undrained: usize,
    /// Workers that missed the join bound and were left detached.
    pub stalled_workers: usize,
}

impl ShutdownReport {
    /// True when every order was accounted for and every worker stopped in
    /// time.
    pub fn is_clean(&self) -> bool {
        self.undrained == 0 && self.stalled_workers == 0
    }
}

/// Owns the queue, the consumer workers, and the payment pool.
///
/// Producers interact through cloneable [`OrderIntake`] handles; the system
/// itself is held by whoever is responsible for calling
/// [`shutdown`](Self::shutdown).
pub struct OrderSystem {
    queue: Arc<WorkQueue<Order>>,
    payment_pool: Arc<TaskPool>,
    intake: OrderIntake,
    workers: Vec<JoinHandle<()>>,
    stop: CancellationToken,
    join_timeout: Duration,
}

impl OrderSystem {
    /// Builds the pipeline and starts its worker tasks.
    ///
    /// The inventory, catalog, and gateway are injected as trait objects so
    /// tests and demos can substitute their own collaborators at the seam.
    pub fn new(
        config: PipelineConfig,
        inventory: Arc<dyn Inventory>,
        catalog: Arc<dyn ProductCatalog>,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        let queue = Arc::new(WorkQueue::new(config.queue_capacity));
        let payment_pool = Arc::new(TaskPool::new(config.payment_concurrency));
        let payments = PaymentProcessor::new(Arc::clone(&payment_pool), gateway);
        let stop = CancellationToken::new();

        let workers = (0..config.workers)
            .map(|id| {
                let worker = OrderWorker::new(
                    id,
                    Arc::clone(&queue),
                    Arc::clone(&inventory),
                    payments.clone(),
                    stop.child_token(),
                    config.payment_timeout,
                );
                tokio::spawn(worker.run())
            })
            .collect();

        info!(
            workers = config.workers,
            queue_capacity = config.queue_capacity,
            payment_concurrency = config.payment_concurrency,
            "Order system started"
        );

        Self {
            intake: OrderIntake::new(Arc::clone(&queue), catalog),
            queue,
            payment_pool,
            workers,
            stop,
            join_timeout: config.join_timeout,
        }
    }

    /// A submission handle for producers. Cheap to clone; stays valid after
    /// shutdown, at which point submissions fail fast.
    pub fn intake(&self) -> OrderIntake {
        self.intake.clone()
    }

    /// Snapshot of how many orders are waiting to be dequeued.
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Winds the pipeline down and reports what was left behind.
    ///
    /// Safe to call while producers are still submitting: their enqueues
    /// fail fast once the queue closes. Idempotence is by construction —
    /// the system is consumed, so shutdown can only run once.
    pub async fn shutdown(self) -> ShutdownReport {
        info!("Shutting down order system");
        self.queue.shutdown();
        self.stop.cancel();

        let mut stalled_workers = 0;
        for (id, handle) in self.workers.into_iter().enumerate() {
            match tokio::time::timeout(self.join_timeout, handle).await {
                Ok(Ok(())) => {}
                Ok(Err(join_err)) => {
                    warn!(worker = id, error = %join_err, "Worker task did not finish cleanly");
                }
                Err(_) => {
                    warn!(worker = id, "Worker missed the join bound; detaching");
                    stalled_workers += 1;
                }
            }
        }

        self.payment_pool.shutdown();

        let undrained = self.queue.len();
        if undrained > 0 {
            warn!(undrained, "Orders left queued at shutdown");
        }
        info!(undrained, stalled_workers, "Order system stopped");
        ShutdownReport {
            undrained,
            stalled_workers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InMemoryCatalog;
    use crate::intake::OrderForm;
    use crate::inventory::InMemoryInventory;
    use crate::model::{OrderStatus, ProductId};
    use crate::payment::SimulatedGateway;

    fn small_config() -> PipelineConfig {
        PipelineConfig {
            workers: 2,
            queue_capacity: 8,
            payment_concurrency: 2,
            payment_timeout: Duration::from_secs(1),
            join_timeout: Duration::from_secs(1),
        }
    }

    fn widget() -> ProductId {
        ProductId::new("widget")
    }

    fn collaborators() -> (Arc<InMemoryInventory>, Arc<InMemoryCatalog>) {
        let inventory = Arc::new(InMemoryInventory::new());
        inventory.restock(&widget(), 100);
        let catalog = Arc::new(InMemoryCatalog::new().with_product(widget(), "Widget", 4.0));
        (inventory, catalog)
    }

    #[tokio::test]
    async fn idle_system_shuts_down_clean() {
        let (inventory, catalog) = collaborators();
        let gateway = Arc::new(SimulatedGateway::approving(Duration::from_millis(1)));
        let system = OrderSystem::new(small_config(), inventory, catalog, gateway);

        let report = system.shutdown().await;
        assert!(report.is_clean());
    }

    #[tokio::test]
    async fn submitted_order_completes_end_to_end() {
        let (inventory, catalog) = collaborators();
        let gateway = Arc::new(SimulatedGateway::approving(Duration::from_millis(5)));
        let system = OrderSystem::new(small_config(), inventory.clone(), catalog, gateway);

        let mut receipt = system
            .intake()
            .submit(OrderForm {
                product_id: widget(),
                quantity: 3,
                idempotency_key: None,
            })
            .await
            .unwrap();

        assert_eq!(receipt.wait_terminal().await, OrderStatus::Completed);
        assert_eq!(inventory.available(&widget()), 97);
        assert_eq!(inventory.reserved(&widget()), 0);

        let report = system.shutdown().await;
        assert!(report.is_clean());
    }
}
