//! # Bounded Task Pool
//!
//! Executes async sub-tasks off a worker's critical path, under a fixed
//! concurrency bound, returning handles that make timeout and cancellation
//! first-class operations.
//!
//! # Architecture Note
//! The pool does not own threads. Each submitted future is spawned onto the
//! runtime immediately, but must acquire one of the pool's semaphore permits
//! before it starts executing, so at most `size` tasks run at once — sized
//! independently of the consumer workers, since sub-tasks are typically
//! I/O-bound with their own concurrency limits.
//!
//! Every task runs under a child `CancellationToken` of the pool. The handle
//! can cancel just its own task; [`TaskPool::shutdown`] cancels the parent
//! and with it everything still queued or in flight.

use crate::error::TaskError;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// A fixed-size pool for cancellable, awaitable sub-tasks.
pub struct TaskPool {
    permits: Arc<Semaphore>,
    shutdown: CancellationToken,
}

impl TaskPool {
    /// Creates a pool that runs at most `size` tasks concurrently.
    ///
    /// # Panics
    /// Panics if `size` is zero.
    pub fn new(size: usize) -> Self {
        assert!(size > 0, "task pool size must be non-zero");
        Self {
            permits: Arc::new(Semaphore::new(size)),
            shutdown: CancellationToken::new(),
        }
    }

    /// Dispatches a future to the pool, returning its handle.
    ///
    /// The task waits for a free slot before executing and observes
    /// cancellation both while queued and while running. Dropping the
    /// handle detaches the task (fire-and-forget); it still runs to
    /// completion unless cancelled.
    pub fn submit<F, R>(&self, task: F) -> TaskHandle<R>
    where
        F: Future<Output = R> + Send + 'static,
        R: Send + 'static,
    {
        let permits = Arc::clone(&self.permits);
        let cancel = self.shutdown.child_token();
        let token = cancel.clone();
        let join = tokio::spawn(async move {
            let _permit = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(TaskError::Cancelled),
                permit = permits.acquire_owned() => {
                    permit.expect("task pool semaphore is never closed")
                }
            };
            tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(TaskError::Cancelled),
                output = task => Ok(output),
            }
        });
        TaskHandle { join, cancel: token }
    }

    /// Cancels every queued and in-flight task. Idempotent.
    ///
    /// Outstanding handles resolve to [`TaskError::Cancelled`]; later
    /// submissions are cancelled before they start.
    pub fn shutdown(&self) {
        if !self.shutdown.is_cancelled() {
            debug!("Task pool shutting down");
        }
        self.shutdown.cancel();
    }

    /// Whether the pool has been shut down.
    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}

/// Handle to a task dispatched through a [`TaskPool`].
///
/// Awaiting is deadline-bounded and consumes the handle: the submitting
/// caller is the only consumer of the result.
pub struct TaskHandle<R> {
    join: JoinHandle<Result<R, TaskError>>,
    cancel: CancellationToken,
}

impl<R> TaskHandle<R> {
    /// Requests best-effort cancellation of the task.
    ///
    /// A task that has not started yet never will; a running task is
    /// abandoned at its next await point.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// A token that cancels this task, usable after the handle itself has
    /// been moved into `await_result`.
    pub fn canceller(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Waits for the task's result, up to `limit`.
    ///
    /// On expiry the task is cancelled and `TaskError::TimedOut` is
    /// reported; the result, if one is produced later, is discarded.
    pub async fn await_result(self, limit: Duration) -> Result<R, TaskError> {
        let cancel = self.cancel;
        match tokio::time::timeout(limit, self.join).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) => Err(TaskError::Panicked(join_err.to_string())),
            Err(_) => {
                cancel.cancel();
                Err(TaskError::TimedOut(limit))
            }
        }
    }

    /// Waits for the task's result with no deadline.
    ///
    /// Still unblocks on cancellation, reporting `TaskError::Cancelled`.
    pub async fn join(self) -> Result<R, TaskError> {
        match self.join.await {
            Ok(result) => result,
            Err(join_err) => Err(TaskError::Panicked(join_err.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Sets a flag when the future holding it is dropped, which is how a
    /// select-cancelled task ends.
    struct SetOnDrop(Arc<AtomicBool>);

    impl Drop for SetOnDrop {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn submit_returns_the_task_result() {
        let pool = TaskPool::new(2);
        let handle = pool.submit(async { 21 * 2 });
        let result = handle.await_result(Duration::from_secs(1)).await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn await_result_times_out_and_cancels() {
        let pool = TaskPool::new(1);
        let dropped = Arc::new(AtomicBool::new(false));
        let guard = SetOnDrop(dropped.clone());
        let handle = pool.submit(async move {
            let _guard = guard;
            std::future::pending::<()>().await;
        });

        let result = handle.await_result(Duration::from_millis(50)).await;
        assert_eq!(result.unwrap_err(), TaskError::TimedOut(Duration::from_millis(50)));

        // The cancelled task unwinds promptly, dropping its state.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(dropped.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn cancel_resolves_a_pending_task() {
        let pool = TaskPool::new(1);
        let handle = pool.submit(std::future::pending::<()>());
        handle.cancel();
        let result = handle.await_result(Duration::from_secs(1)).await;
        assert_eq!(result.unwrap_err(), TaskError::Cancelled);
    }

    #[tokio::test]
    async fn pool_bounds_concurrent_tasks() {
        let pool = TaskPool::new(2);
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let active = active.clone();
                let peak = peak.clone();
                pool.submit(async move {
                    let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    active.fetch_sub(1, Ordering::SeqCst);
                })
            })
            .collect();

        for handle in handles {
            handle.await_result(Duration::from_secs(5)).await.unwrap();
        }
        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn shutdown_cancels_in_flight_and_future_tasks() {
        let pool = TaskPool::new(1);
        let in_flight = pool.submit(std::future::pending::<()>());
        pool.shutdown();
        assert!(pool.is_shut_down());

        let result = in_flight.await_result(Duration::from_secs(1)).await;
        assert_eq!(result.unwrap_err(), TaskError::Cancelled);

        let late = pool.submit(async { 1 });
        let result = late.await_result(Duration::from_secs(1)).await;
        assert_eq!(result.unwrap_err(), TaskError::Cancelled);
    }
}
