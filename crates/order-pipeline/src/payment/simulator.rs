//! In-process reference gateway for demos and tests.

use crate::model::{PaymentOutcome, PaymentResult, TransactionRef};
use crate::payment::{ChargeRequest, PaymentError, PaymentGateway, RefundRequest};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone)]
enum GatewayMode {
    Approve,
    Decline(String),
    /// Never completes; exercises the timeout and cancellation paths.
    Unresponsive,
}

/// Simulated payment gateway with configurable latency and behavior.
///
/// Mints sequential transaction references and records every refund request
/// it receives, so tests can assert on compensation traffic.
pub struct SimulatedGateway {
    latency: Duration,
    mode: GatewayMode,
    txn_counter: AtomicU64,
    refunds: Mutex<Vec<RefundRequest>>,
}

impl SimulatedGateway {
    /// Approves every charge after `latency`.
    pub fn approving(latency: Duration) -> Self {
        Self::with_mode(latency, GatewayMode::Approve)
    }

    /// Declines every charge after `latency` with the given reason.
    pub fn declining(latency: Duration, reason: impl Into<String>) -> Self {
        Self::with_mode(latency, GatewayMode::Decline(reason.into()))
    }

    /// Never answers a charge. Refunds still complete.
    pub fn unresponsive() -> Self {
        Self::with_mode(Duration::ZERO, GatewayMode::Unresponsive)
    }

    fn with_mode(latency: Duration, mode: GatewayMode) -> Self {
        Self {
            latency,
            mode,
            txn_counter: AtomicU64::new(1),
            refunds: Mutex::new(Vec::new()),
        }
    }

    fn next_reference(&self) -> TransactionRef {
        let n = self.txn_counter.fetch_add(1, Ordering::SeqCst);
        TransactionRef::new(format!("txn_{n}"))
    }

    /// Refund requests received so far.
    pub fn refunds(&self) -> Vec<RefundRequest> {
        self.refunds.lock().expect("refund log poisoned").clone()
    }

    pub fn refund_count(&self) -> usize {
        self.refunds.lock().expect("refund log poisoned").len()
    }
}

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    async fn charge(&self, request: ChargeRequest) -> Result<PaymentResult, PaymentError> {
        match &self.mode {
            GatewayMode::Unresponsive => {
                std::future::pending::<()>().await;
                unreachable!("pending future never resolves")
            }
            GatewayMode::Approve => {
                tokio::time::sleep(self.latency).await;
                Ok(PaymentResult {
                    order_id: request.order_id,
                    reference: self.next_reference(),
                    outcome: PaymentOutcome::Approved,
                })
            }
            GatewayMode::Decline(reason) => {
                tokio::time::sleep(self.latency).await;
                Ok(PaymentResult {
                    order_id: request.order_id,
                    reference: self.next_reference(),
                    outcome: PaymentOutcome::Declined {
                        reason: reason.clone(),
                    },
                })
            }
        }
    }

    async fn refund(&self, request: RefundRequest) -> Result<PaymentResult, PaymentError> {
        tokio::time::sleep(self.latency).await;
        info!(order = %request.order_id, amount = request.amount, "Refund received");
        let result = PaymentResult {
            order_id: request.order_id.clone(),
            reference: self.next_reference(),
            outcome: PaymentOutcome::Approved,
        };
        self.refunds
            .lock()
            .expect("refund log poisoned")
            .push(request);
        Ok(result)
    }
}
