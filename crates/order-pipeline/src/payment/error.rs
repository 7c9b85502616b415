//! Error types for payment operations.

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while charging or refunding an order.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PaymentError {
    /// The gateway could not be reached or failed internally.
    #[error("Gateway unavailable: {0}")]
    GatewayUnavailable(String),

    /// No result arrived within the await deadline; the in-flight task was
    /// cancelled best-effort.
    #[error("Payment did not complete within {0:?}")]
    TimedOut(Duration),

    /// The payment task was cancelled before producing a result.
    #[error("Payment cancelled")]
    Cancelled,

    /// The payment task itself crashed.
    #[error("Payment task failed: {0}")]
    TaskFailed(String),
}

impl From<pipeline_core::TaskError> for PaymentError {
    fn from(err: pipeline_core::TaskError) -> Self {
        match err {
            pipeline_core::TaskError::Cancelled => PaymentError::Cancelled,
            pipeline_core::TaskError::TimedOut(limit) => PaymentError::TimedOut(limit),
            pipeline_core::TaskError::Panicked(msg) => PaymentError::TaskFailed(msg),
        }
    }
}
