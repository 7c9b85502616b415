//! # Order Worker
//!
//! The consumer side of the pipeline: a worker dequeues one order at a time
//! and drives it through the processing state machine. Orders arrive by
//! value, so the worker owns each one exclusively until it reaches a
//! terminal status; nothing is ever handed back to the queue.
//!
//! ## State Machine
//!
//! ```text
//! Pending -> Cancelled                  cancel requested before any work
//! Pending -> Failed                     reservation fails
//! Pending -> InventoryChecked           stock reserved
//! InventoryChecked -> PaymentProcessing charge submitted
//! PaymentProcessing -> Failed           declined, gateway error, or timeout
//! PaymentProcessing -> PaymentCompleted approved
//! PaymentCompleted -> Failed            commit fails -> async refund
//! PaymentCompleted -> ShippingPrepared  commit succeeds
//! ShippingPrepared -> Completed         terminal success
//! ```
//!
//! ## Containment
//!
//! A failure in one order is recorded on that order and never escapes the
//! loop; the worker moves on to the next item. The stop token is raced at
//! the loop head, inside the dequeue wait, and across the payment await, so
//! shutdown never leaves the worker blocked. A stop that lands mid-payment
//! cancels the charge, releases the reservation, marks the order `Failed`,
//! and exits the loop.

use crate::inventory::Inventory;
use crate::model::{Order, OrderStatus};
use crate::payment::{ChargeRequest, PaymentProcessor, RefundRequest};
use pipeline_core::{Dequeue, WorkQueue};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// The stop signal landed inside a blocking wait; the current order has
/// been unwound and the worker loop must exit.
struct Interrupted;

/// A single consumer worker. One `run()` call per worker task.
pub struct OrderWorker {
    id: usize,
    queue: Arc<WorkQueue<Order>>,
    inventory: Arc<dyn Inventory>,
    payments: PaymentProcessor,
    stop: CancellationToken,
    payment_timeout: Duration,
}

impl OrderWorker {
    pub fn new(
        id: usize,
        queue: Arc<WorkQueue<Order>>,
        inventory: Arc<dyn Inventory>,
        payments: PaymentProcessor,
        stop: CancellationToken,
        payment_timeout: Duration,
    ) -> Self {
        Self {
            id,
            queue,
            inventory,
            payments,
            stop,
            payment_timeout,
        }
    }

    /// Consumer loop: dequeue, process, repeat until the queue closes or
    /// the stop signal fires.
    pub async fn run(self) {
        info!(worker = self.id, "Order worker started");
        loop {
            if self.stop.is_cancelled() {
                break;
            }
            let order = tokio::select! {
                biased;
                _ = self.stop.cancelled() => break,
                dequeued = self.queue.dequeue() => match dequeued {
                    Dequeue::Item(order) => order,
                    Dequeue::Closed => {
                        debug!(worker = self.id, "Queue closed, no more work");
                        break;
                    }
                }
            };

            let order_id = order.id.clone();
            match self.process(order).await {
                Ok(status) => {
                    info!(worker = self.id, order = %order_id, ?status, "Order finished");
                }
                Err(Interrupted) => {
                    warn!(
                        worker = self.id,
                        order = %order_id,
                        "Stopped mid-order; unwound as failed"
                    );
                    break;
                }
            }
        }
        info!(worker = self.id, "Order worker stopped");
    }

    /// Drives one order to a terminal status.
    ///
    /// Domain failures are recorded on the order and returned as `Ok`; the
    /// only `Err` is a stop signal during the payment wait.
    async fn process(&self, order: Order) -> Result<OrderStatus, Interrupted> {
        if order.is_cancel_requested() {
            debug!(order = %order.id, "Cancel requested before processing");
            order.set_status(OrderStatus::Cancelled);
            return Ok(OrderStatus::Cancelled);
        }

        // Stage 1: reservation. The check and decrement are one critical
        // section inside the ledger.
        if let Err(err) = self.inventory.reserve(&order.product_id, order.quantity) {
            warn!(order = %order.id, error = %err, "Reservation failed");
            order.set_status(OrderStatus::Failed);
            return Ok(OrderStatus::Failed);
        }
        order.set_status(OrderStatus::InventoryChecked);

        // Stage 2: payment, off the critical path with a hard deadline.
        order.set_status(OrderStatus::PaymentProcessing);
        let attempt = self.payments.submit_charge(ChargeRequest {
            order_id: order.id.clone(),
            amount: order.total,
            idempotency_key: order.idempotency_key.clone(),
        });
        let canceller = attempt.canceller();
        let verdict = tokio::select! {
            biased;
            _ = self.stop.cancelled() => {
                canceller.cancel();
                self.inventory.release(&order.product_id, order.quantity);
                order.set_status(OrderStatus::Failed);
                return Err(Interrupted);
            }
            verdict = attempt.await_result(self.payment_timeout) => verdict,
        };
        match verdict {
            Ok(result) if result.is_approved() => {
                debug!(order = %order.id, reference = %result.reference, "Payment approved");
            }
            Ok(result) => {
                warn!(order = %order.id, outcome = ?result.outcome, "Payment declined");
                self.inventory.release(&order.product_id, order.quantity);
                order.set_status(OrderStatus::Failed);
                return Ok(OrderStatus::Failed);
            }
            Err(err) => {
                warn!(order = %order.id, error = %err, "Payment did not complete");
                self.inventory.release(&order.product_id, order.quantity);
                order.set_status(OrderStatus::Failed);
                return Ok(OrderStatus::Failed);
            }
        }
        order.set_status(OrderStatus::PaymentCompleted);

        // Stage 3: shipment bookkeeping. Payment has been taken, so a
        // failure here compensates with a refund instead of a release.
        if let Err(err) = self.inventory.commit(&order.product_id, order.quantity) {
            error!(
                order = %order.id,
                error = %err,
                "Inventory commit failed after payment; submitting refund"
            );
            self.payments
                .submit_refund(RefundRequest {
                    order_id: order.id.clone(),
                    amount: order.total,
                    idempotency_key: order.idempotency_key.clone(),
                })
                .detach();
            order.set_status(OrderStatus::Failed);
            return Ok(OrderStatus::Failed);
        }
        order.set_status(OrderStatus::ShippingPrepared);

        order.set_status(OrderStatus::Completed);
        Ok(OrderStatus::Completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::{InMemoryInventory, InventoryError};
    use crate::model::{OrderId, ProductId};
    use crate::payment::SimulatedGateway;
    use pipeline_core::TaskPool;
    use std::time::Instant;

    fn widget() -> ProductId {
        ProductId::new("widget")
    }

    fn worker_with(
        inventory: Arc<dyn Inventory>,
        gateway: Arc<SimulatedGateway>,
        payment_timeout: Duration,
    ) -> OrderWorker {
        let queue = Arc::new(WorkQueue::new(4));
        let pool = Arc::new(TaskPool::new(2));
        OrderWorker::new(
            0,
            queue,
            inventory,
            PaymentProcessor::new(pool, gateway),
            CancellationToken::new(),
            payment_timeout,
        )
    }

    fn order(quantity: u32) -> (Order, crate::model::OrderReceipt) {
        Order::new(OrderId(1), widget(), quantity, 10.0, None)
    }

    #[tokio::test]
    async fn happy_path_completes_and_commits_stock() {
        let inventory = Arc::new(InMemoryInventory::new());
        inventory.restock(&widget(), 10);
        let gateway = Arc::new(SimulatedGateway::approving(Duration::from_millis(5)));
        let worker = worker_with(inventory.clone(), gateway, Duration::from_secs(1));

        let (order, receipt) = order(3);
        let status = worker.process(order).await.unwrap_or(OrderStatus::Failed);

        assert_eq!(status, OrderStatus::Completed);
        assert_eq!(receipt.status(), OrderStatus::Completed);
        assert_eq!(inventory.available(&widget()), 7);
        assert_eq!(inventory.reserved(&widget()), 0);
    }

    #[tokio::test]
    async fn cancel_requested_before_work_leaves_inventory_untouched() {
        let inventory = Arc::new(InMemoryInventory::new());
        inventory.restock(&widget(), 10);
        let gateway = Arc::new(SimulatedGateway::approving(Duration::from_millis(5)));
        let worker = worker_with(inventory.clone(), gateway, Duration::from_secs(1));

        let (order, receipt) = order(3);
        receipt.request_cancel();
        let status = worker.process(order).await.unwrap_or(OrderStatus::Failed);

        assert_eq!(status, OrderStatus::Cancelled);
        assert_eq!(inventory.available(&widget()), 10);
        assert_eq!(inventory.reserved(&widget()), 0);
    }

    #[tokio::test]
    async fn insufficient_stock_fails_without_payment() {
        let inventory = Arc::new(InMemoryInventory::new());
        inventory.restock(&widget(), 2);
        let gateway = Arc::new(SimulatedGateway::approving(Duration::from_millis(5)));
        let worker = worker_with(inventory.clone(), gateway, Duration::from_secs(1));

        let (order, receipt) = order(3);
        let status = worker.process(order).await.unwrap_or(OrderStatus::Completed);

        assert_eq!(status, OrderStatus::Failed);
        assert_eq!(receipt.status(), OrderStatus::Failed);
        assert_eq!(inventory.available(&widget()), 2);
    }

    #[tokio::test]
    async fn declined_payment_releases_the_reservation() {
        let inventory = Arc::new(InMemoryInventory::new());
        inventory.restock(&widget(), 10);
        let gateway = Arc::new(SimulatedGateway::declining(
            Duration::from_millis(5),
            "card expired",
        ));
        let worker = worker_with(inventory.clone(), gateway, Duration::from_secs(1));

        let (order, _receipt) = order(4);
        let status = worker.process(order).await.unwrap_or(OrderStatus::Completed);

        assert_eq!(status, OrderStatus::Failed);
        assert_eq!(inventory.available(&widget()), 10);
        assert_eq!(inventory.reserved(&widget()), 0);
    }

    #[tokio::test]
    async fn payment_timeout_fails_the_order_within_the_deadline() {
        let inventory = Arc::new(InMemoryInventory::new());
        inventory.restock(&widget(), 10);
        let gateway = Arc::new(SimulatedGateway::unresponsive());
        let worker = worker_with(inventory.clone(), gateway, Duration::from_millis(100));

        let (order, _receipt) = order(1);
        let started = Instant::now();
        let status = worker.process(order).await.unwrap_or(OrderStatus::Completed);

        assert_eq!(status, OrderStatus::Failed);
        assert!(started.elapsed() < Duration::from_secs(1));
        assert_eq!(inventory.available(&widget()), 10);
    }

    /// Inventory whose commit always fails, standing in for bookkeeping
    /// that breaks only after payment has been taken.
    struct CommitAlwaysFails(InMemoryInventory);

    impl Inventory for CommitAlwaysFails {
        fn has_stock(&self, product: &ProductId, quantity: u32) -> bool {
            self.0.has_stock(product, quantity)
        }
        fn reserve(&self, product: &ProductId, quantity: u32) -> Result<(), InventoryError> {
            self.0.reserve(product, quantity)
        }
        fn release(&self, product: &ProductId, quantity: u32) {
            self.0.release(product, quantity);
        }
        fn commit(&self, product: &ProductId, quantity: u32) -> Result<(), InventoryError> {
            Err(InventoryError::NoReservation {
                product: product.clone(),
                requested: quantity,
                reserved: 0,
            })
        }
        fn available(&self, product: &ProductId) -> u32 {
            self.0.available(product)
        }
    }

    #[tokio::test]
    async fn commit_failure_after_payment_submits_exactly_one_refund() {
        let inner = InMemoryInventory::new();
        inner.restock(&widget(), 10);
        let inventory = Arc::new(CommitAlwaysFails(inner));
        let gateway = Arc::new(SimulatedGateway::approving(Duration::from_millis(5)));
        let worker = worker_with(inventory, gateway.clone(), Duration::from_secs(1));

        let (order, receipt) = order(2);
        let status = worker.process(order).await.unwrap_or(OrderStatus::Completed);
        assert_eq!(status, OrderStatus::Failed);
        assert_eq!(receipt.status(), OrderStatus::Failed);

        // The refund is fire-and-forget; give it a moment to land.
        let deadline = Instant::now() + Duration::from_secs(2);
        while gateway.refund_count() == 0 && Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(gateway.refund_count(), 1);
        assert_eq!(gateway.refunds()[0].order_id, OrderId(1));
    }

    #[tokio::test]
    async fn run_exits_when_the_queue_closes() {
        let inventory = Arc::new(InMemoryInventory::new());
        inventory.restock(&widget(), 10);
        let gateway = Arc::new(SimulatedGateway::approving(Duration::from_millis(1)));
        let queue = Arc::new(WorkQueue::new(4));
        let pool = Arc::new(TaskPool::new(2));
        let worker = OrderWorker::new(
            0,
            queue.clone(),
            inventory.clone(),
            PaymentProcessor::new(pool, gateway),
            CancellationToken::new(),
            Duration::from_secs(1),
        );

        let (order, mut receipt) = Order::new(OrderId(9), widget(), 1, 5.0, None);
        queue.enqueue(order).await.unwrap();
        queue.shutdown();

        // Processes the buffered order, then sees the sentinel and stops.
        worker.run().await;
        assert_eq!(receipt.wait_terminal().await, OrderStatus::Completed);
        assert_eq!(inventory.available(&widget()), 9);
    }
}
