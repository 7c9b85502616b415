//! The gateway contract and its request payloads.

use crate::model::{OrderId, PaymentResult};
use crate::payment::PaymentError;
use async_trait::async_trait;

/// Payload for charging an order.
#[derive(Debug, Clone)]
pub struct ChargeRequest {
    pub order_id: OrderId,
    pub amount: f64,
    /// Forwarded verbatim so the gateway can deduplicate retried charges.
    pub idempotency_key: Option<String>,
}

/// Payload for refunding an order after a downstream failure.
#[derive(Debug, Clone)]
pub struct RefundRequest {
    pub order_id: OrderId,
    pub amount: f64,
    pub idempotency_key: Option<String>,
}

/// External payment collaborator.
///
/// Implementations execute the actual money movement; the pipeline only
/// submits requests through the [`PaymentProcessor`](crate::payment::PaymentProcessor)
/// and consumes the results.
#[async_trait]
pub trait PaymentGateway: Send + Sync + 'static {
    /// Charges the order's total. Declines are an `Ok` result carrying a
    /// declined outcome; `Err` means the gateway itself failed.
    async fn charge(&self, request: ChargeRequest) -> Result<PaymentResult, PaymentError>;

    /// Refunds a previously attempted charge. Must be safe to submit after
    /// a failed or partially-applied payment.
    async fn refund(&self, request: RefundRequest) -> Result<PaymentResult, PaymentError>;
}
