//! Pool-backed payment submission.

use crate::model::PaymentResult;
use crate::payment::{ChargeRequest, PaymentError, PaymentGateway, RefundRequest};
use pipeline_core::{TaskHandle, TaskPool};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Dispatches gateway calls through the shared task pool.
///
/// Cheap to clone; all workers share one processor, so the pool's
/// concurrency bound applies to payments and refunds across the whole
/// pipeline.
#[derive(Clone)]
pub struct PaymentProcessor {
    pool: Arc<TaskPool>,
    gateway: Arc<dyn PaymentGateway>,
}

impl PaymentProcessor {
    pub fn new(pool: Arc<TaskPool>, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self { pool, gateway }
    }

    /// Submits a charge, returning an awaitable, cancellable attempt.
    pub fn submit_charge(&self, request: ChargeRequest) -> PaymentAttempt {
        debug!(order = %request.order_id, amount = request.amount, "Submitting charge");
        let gateway = Arc::clone(&self.gateway);
        PaymentAttempt {
            handle: self.pool.submit(async move { gateway.charge(request).await }),
        }
    }

    /// Submits a refund. The returned attempt may be dropped to make the
    /// refund fire-and-forget; the task still runs to completion.
    pub fn submit_refund(&self, request: RefundRequest) -> PaymentAttempt {
        debug!(order = %request.order_id, amount = request.amount, "Submitting refund");
        let gateway = Arc::clone(&self.gateway);
        PaymentAttempt {
            handle: self.pool.submit(async move { gateway.refund(request).await }),
        }
    }
}

/// Handle to one in-flight charge or refund.
pub struct PaymentAttempt {
    handle: TaskHandle<Result<PaymentResult, PaymentError>>,
}

impl PaymentAttempt {
    /// Best-effort cancellation of the in-flight gateway call.
    pub fn cancel(&self) {
        self.handle.cancel();
    }

    /// A token that cancels this attempt even after the handle has been
    /// moved into [`await_result`](Self::await_result).
    pub fn canceller(&self) -> CancellationToken {
        self.handle.canceller()
    }

    /// Waits for the gateway's verdict up to `limit`.
    ///
    /// Timeout and cancellation surface as [`PaymentError`] variants; on
    /// timeout the in-flight task has already been cancelled.
    pub async fn await_result(self, limit: Duration) -> Result<PaymentResult, PaymentError> {
        match self.handle.await_result(limit).await {
            Ok(result) => result,
            Err(task_err) => Err(task_err.into()),
        }
    }

    /// Detaches the attempt, logging its eventual outcome in the
    /// background. The operation is not retried if it fails.
    pub fn detach(self) {
        tokio::spawn(async move {
            match self.handle.join().await {
                Ok(Ok(result)) => {
                    debug!(
                        order = %result.order_id,
                        reference = %result.reference,
                        outcome = ?result.outcome,
                        "Detached payment settled"
                    );
                }
                Ok(Err(err)) => {
                    tracing::error!(error = %err, "Detached payment failed");
                }
                Err(task_err) => {
                    tracing::error!(error = %task_err, "Detached payment did not run");
                }
            }
        });
    }
}
