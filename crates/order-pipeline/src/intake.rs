//! Producer-facing order submission.

use crate::catalog::ProductCatalog;
use crate::model::{Order, OrderId, OrderReceipt, ProductId};
use pipeline_core::WorkQueue;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, instrument};

/// What a producer asks for; the intake prices and identifies it.
#[derive(Debug, Clone)]
pub struct OrderForm {
    pub product_id: ProductId,
    pub quantity: u32,
    pub idempotency_key: Option<String>,
}

/// Errors surfaced to producers at submission time.
///
/// Everything past enqueue is reported through the receipt's terminal
/// status instead.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SubmitError {
    /// The product is not in the catalog.
    #[error("Unknown product: {0}")]
    UnknownProduct(ProductId),

    /// The requested quantity is zero.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(u32),

    /// The pipeline is shutting down; nothing was enqueued.
    #[error("Pipeline is shut down")]
    PipelineClosed,
}

/// Cloneable submission handle shared by all producers.
///
/// Prices the order against the catalog, mints its identity, and enqueues
/// it — suspending on backpressure when the queue is at capacity.
#[derive(Clone)]
pub struct OrderIntake {
    queue: Arc<WorkQueue<Order>>,
    catalog: Arc<dyn ProductCatalog>,
    next_order_id: Arc<AtomicU64>,
}

impl OrderIntake {
    pub fn new(queue: Arc<WorkQueue<Order>>, catalog: Arc<dyn ProductCatalog>) -> Self {
        Self {
            queue,
            catalog,
            next_order_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Validates, prices, and enqueues an order, returning the receipt the
    /// producer uses to observe and cancel it.
    #[instrument(skip(self))]
    pub async fn submit(&self, form: OrderForm) -> Result<OrderReceipt, SubmitError> {
        if form.quantity == 0 {
            return Err(SubmitError::InvalidQuantity(form.quantity));
        }
        let info = self
            .catalog
            .lookup(&form.product_id)
            .ok_or_else(|| SubmitError::UnknownProduct(form.product_id.clone()))?;

        let id = OrderId(self.next_order_id.fetch_add(1, Ordering::SeqCst));
        let total = info.price * f64::from(form.quantity);
        let (order, receipt) = Order::new(
            id,
            form.product_id,
            form.quantity,
            total,
            form.idempotency_key,
        );

        debug!(order = %order.id, total, "Enqueuing order");
        self.queue
            .enqueue(order)
            .await
            .map_err(|_| SubmitError::PipelineClosed)?;
        Ok(receipt)
    }
}
