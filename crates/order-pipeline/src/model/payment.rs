use crate::model::OrderId;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Opaque reference to a gateway-side transaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionRef(String);

impl TransactionRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }
}

impl Display for TransactionRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Gateway verdict on a charge or refund.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentOutcome {
    Approved,
    Declined { reason: String },
}

/// Outcome of a payment operation, produced by the gateway and consumed
/// exactly once by the worker that submitted it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentResult {
    pub order_id: OrderId,
    pub reference: TransactionRef,
    pub outcome: PaymentOutcome,
}

impl PaymentResult {
    pub fn is_approved(&self) -> bool {
        self.outcome == PaymentOutcome::Approved
    }
}
