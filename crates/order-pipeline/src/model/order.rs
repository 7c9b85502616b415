//! The order, its status lifecycle, and the producer-held receipt.
//!
//! An [`Order`] is created `Pending` by a producer and then owned by exactly
//! one party at a time: the queue while buffered, then the single worker
//! that dequeued it. Only that worker writes the status, and once a terminal
//! status is set the order is never touched again. The producer keeps an
//! [`OrderReceipt`] — the read side of the status cell plus the
//! cancel-request flag, which an external actor may set at any time before
//! the order reaches a terminal state.

use crate::model::ProductId;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

/// Type-safe identifier for orders.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub u64);

impl From<u64> for OrderId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "order_{}", self.0)
    }
}

/// Processing status of an order.
///
/// `Completed`, `Failed`, and `Cancelled` are terminal; every other status
/// is transient and only ever observed mid-processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Created by a producer; no work performed yet.
    Pending,
    /// Stock reserved for the full quantity.
    InventoryChecked,
    /// Charge submitted to the payment pool; worker awaiting the result.
    PaymentProcessing,
    /// Gateway approved the charge.
    PaymentCompleted,
    /// Reservation committed; shipment bookkeeping done.
    ShippingPrepared,
    /// Terminal success.
    Completed,
    /// Terminal failure; see the worker logs for the cause.
    Failed,
    /// Terminal: cancel was requested before any work started.
    Cancelled,
}

impl OrderStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            OrderStatus::Completed | OrderStatus::Failed | OrderStatus::Cancelled
        )
    }
}

/// A customer order travelling through the pipeline.
///
/// Moving the order through the queue transfers exclusive ownership; the
/// processing worker is the only writer of its status.
#[derive(Debug)]
pub struct Order {
    pub id: OrderId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub total: f64,
    /// Producer-supplied key forwarded to the payment gateway so a retried
    /// charge or refund can be deduplicated on the gateway side.
    pub idempotency_key: Option<String>,
    status: watch::Sender<OrderStatus>,
    cancel_requested: Arc<AtomicBool>,
}

impl Order {
    /// Creates a `Pending` order and the receipt its producer keeps.
    pub fn new(
        id: OrderId,
        product_id: ProductId,
        quantity: u32,
        total: f64,
        idempotency_key: Option<String>,
    ) -> (Self, OrderReceipt) {
        let (status, status_rx) = watch::channel(OrderStatus::Pending);
        let cancel_requested = Arc::new(AtomicBool::new(false));
        let receipt = OrderReceipt {
            id: id.clone(),
            status: status_rx,
            cancel_requested: cancel_requested.clone(),
        };
        let order = Self {
            id,
            product_id,
            quantity,
            total,
            idempotency_key,
            status,
            cancel_requested,
        };
        (order, receipt)
    }

    /// Current status snapshot.
    pub fn status(&self) -> OrderStatus {
        *self.status.borrow()
    }

    /// Records a status transition, waking any receipt holder awaiting it.
    ///
    /// Called only by the worker owning the order.
    pub fn set_status(&self, status: OrderStatus) {
        debug!(order = %self.id, ?status, "Status transition");
        self.status.send_replace(status);
    }

    /// Whether an external actor has requested cancellation.
    pub fn is_cancel_requested(&self) -> bool {
        self.cancel_requested.load(Ordering::SeqCst)
    }
}

/// Producer-held handle to an order in flight.
///
/// Cheap to clone. Reads the latest status, can request cancellation, and
/// can await the terminal status.
#[derive(Debug, Clone)]
pub struct OrderReceipt {
    id: OrderId,
    status: watch::Receiver<OrderStatus>,
    cancel_requested: Arc<AtomicBool>,
}

impl OrderReceipt {
    pub fn id(&self) -> &OrderId {
        &self.id
    }

    /// Latest status published by the pipeline.
    pub fn status(&self) -> OrderStatus {
        *self.status.borrow()
    }

    /// Asks the pipeline to cancel this order.
    ///
    /// Best-effort: honored only if the request lands before a worker
    /// starts processing the order.
    pub fn request_cancel(&self) {
        self.cancel_requested.store(true, Ordering::SeqCst);
    }

    /// Waits until the order reaches a terminal status and returns it.
    ///
    /// If the pipeline drops the order without finishing it (for example a
    /// hard shutdown with the order still queued), the last observed status
    /// is returned instead.
    pub async fn wait_terminal(&mut self) -> OrderStatus {
        loop {
            let current = *self.status.borrow_and_update();
            if current.is_terminal() {
                return current;
            }
            if self.status.changed().await.is_err() {
                return *self.status.borrow();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_statuses_are_exactly_the_three() {
        let terminal = [
            OrderStatus::Completed,
            OrderStatus::Failed,
            OrderStatus::Cancelled,
        ];
        let transient = [
            OrderStatus::Pending,
            OrderStatus::InventoryChecked,
            OrderStatus::PaymentProcessing,
            OrderStatus::PaymentCompleted,
            OrderStatus::ShippingPrepared,
        ];
        assert!(terminal.iter().all(|s| s.is_terminal()));
        assert!(transient.iter().all(|s| !s.is_terminal()));
    }

    #[tokio::test]
    async fn receipt_observes_status_transitions() {
        let (order, mut receipt) = Order::new(
            OrderId(1),
            ProductId::new("widget"),
            2,
            10.0,
            None,
        );
        assert_eq!(receipt.status(), OrderStatus::Pending);

        order.set_status(OrderStatus::InventoryChecked);
        order.set_status(OrderStatus::Completed);
        assert_eq!(receipt.wait_terminal().await, OrderStatus::Completed);
    }

    #[tokio::test]
    async fn cancel_request_is_visible_to_the_order() {
        let (order, receipt) = Order::new(
            OrderId(2),
            ProductId::new("widget"),
            1,
            5.0,
            None,
        );
        assert!(!order.is_cancel_requested());
        receipt.request_cancel();
        assert!(order.is_cancel_requested());
    }

    #[tokio::test]
    async fn wait_terminal_reports_last_status_if_order_is_dropped() {
        let (order, mut receipt) = Order::new(
            OrderId(3),
            ProductId::new("widget"),
            1,
            5.0,
            None,
        );
        drop(order);
        assert_eq!(receipt.wait_terminal().await, OrderStatus::Pending);
    }
}
