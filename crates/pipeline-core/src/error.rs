//! # Core Errors
//!
//! Error types shared by the queue and task-pool primitives. Domain crates
//! layer their own error enums on top of these.

use std::time::Duration;

/// Returned by [`WorkQueue::enqueue`](crate::WorkQueue::enqueue) when the
/// queue has been shut down. Carries the rejected item back to the producer
/// so it is not silently dropped.
#[derive(Debug, thiserror::Error)]
#[error("queue is shut down")]
pub struct EnqueueError<T>(pub T);

impl<T> EnqueueError<T> {
    /// Recover the item that could not be enqueued.
    pub fn into_inner(self) -> T {
        self.0
    }
}

/// Errors produced by a [`TaskHandle`](crate::TaskHandle).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TaskError {
    /// The task was cancelled before it produced a result, either through
    /// its handle or by a pool shutdown.
    #[error("task cancelled")]
    Cancelled,

    /// The task did not produce a result within the await deadline. The
    /// handle cancels the task as a side effect of reporting this.
    #[error("task did not complete within {0:?}")]
    TimedOut(Duration),

    /// The task panicked; the payload is the panic message.
    #[error("task panicked: {0}")]
    Panicked(String),
}
