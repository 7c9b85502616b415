//! # Bounded Work Queue
//!
//! A bounded FIFO blocking queue with shutdown propagation, the hand-off
//! point between producers and a pool of consumer workers.
//!
//! # Architecture Note
//! The queue is a monitor: a plain `VecDeque` guarded by its own mutex, with
//! two semaphores standing in for the classic "not full" / "not empty"
//! condition variables. `slots` counts free capacity and parks producers;
//! `items` counts buffered entries and parks consumers. Both wait queues are
//! FIFO, so a blocked party is eventually unblocked, and the buffer itself
//! preserves enqueue order exactly.
//!
//! Shutdown is a `CancellationToken` raced against every blocking wait.
//! Signaling it is idempotent and wakes all blocked producers and consumers
//! at once; producers then fail fast with [`EnqueueError`], while consumers
//! keep draining whatever is still buffered and only then see the
//! [`Dequeue::Closed`] sentinel.

use crate::error::EnqueueError;
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Outcome of a [`WorkQueue::dequeue`] call.
///
/// `Closed` is a sentinel distinct from "momentarily empty": it means the
/// queue has been shut down *and* fully drained, so no more work will ever
/// arrive. Consumer loops use it as their exit condition.
#[derive(Debug, PartialEq, Eq)]
pub enum Dequeue<T> {
    /// An item, now exclusively owned by the caller.
    Item(T),
    /// The queue is shut down and empty; no more work will arrive.
    Closed,
}

/// A bounded FIFO blocking queue shared between producers and consumers.
///
/// Cheap to share behind an `Arc`; all methods take `&self`.
pub struct WorkQueue<T> {
    buf: Mutex<VecDeque<T>>,
    /// Free capacity; producers park here when the queue is full.
    slots: Semaphore,
    /// Buffered items; consumers park here when the queue is empty.
    items: Semaphore,
    closed: CancellationToken,
    capacity: usize,
}

impl<T: Send> WorkQueue<T> {
    /// Creates a queue with the given capacity bound.
    ///
    /// # Panics
    /// Panics if `capacity` is zero — a zero-capacity queue could never
    /// accept an item.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "queue capacity must be non-zero");
        Self {
            buf: Mutex::new(VecDeque::with_capacity(capacity)),
            slots: Semaphore::new(capacity),
            items: Semaphore::new(0),
            closed: CancellationToken::new(),
            capacity,
        }
    }

    /// Appends an item, suspending while the queue is at capacity.
    ///
    /// Returns `Err` carrying the item back if the queue was already shut
    /// down, or if shutdown is signaled while this producer is blocked
    /// waiting for space.
    pub async fn enqueue(&self, item: T) -> Result<(), EnqueueError<T>> {
        if self.closed.is_cancelled() {
            return Err(EnqueueError(item));
        }
        let permit = tokio::select! {
            biased;
            _ = self.closed.cancelled() => return Err(EnqueueError(item)),
            permit = self.slots.acquire() => {
                permit.expect("queue semaphore is never closed")
            }
        };
        // The slot permit is consumed for good: it comes back as a fresh
        // permit in `slots` when a consumer removes the item.
        permit.forget();
        self.buf
            .lock()
            .expect("queue lock poisoned")
            .push_back(item);
        self.items.add_permits(1);
        Ok(())
    }

    /// Removes the oldest item, suspending while the queue is empty.
    ///
    /// Once shutdown is signaled, remaining buffered items are still handed
    /// out; only an empty, shut-down queue reports [`Dequeue::Closed`].
    pub async fn dequeue(&self) -> Dequeue<T> {
        loop {
            // Drain before honoring shutdown, so items buffered at the
            // moment of shutdown are not lost.
            if let Ok(permit) = self.items.try_acquire() {
                permit.forget();
                return Dequeue::Item(self.take_front());
            }
            if self.closed.is_cancelled() {
                return Dequeue::Closed;
            }
            tokio::select! {
                _ = self.closed.cancelled() => {
                    // Re-check from the top: another consumer may race us
                    // for the last buffered items.
                }
                permit = self.items.acquire() => {
                    permit.expect("queue semaphore is never closed").forget();
                    return Dequeue::Item(self.take_front());
                }
            }
        }
    }

    fn take_front(&self) -> T {
        let item = self
            .buf
            .lock()
            .expect("queue lock poisoned")
            .pop_front()
            .expect("item semaphore permit without a buffered item");
        self.slots.add_permits(1);
        item
    }

    /// Signals shutdown, waking all blocked producers and consumers.
    ///
    /// Idempotent. Subsequent `enqueue` calls fail fast; `dequeue` drains
    /// the remaining buffer and then reports [`Dequeue::Closed`].
    pub fn shutdown(&self) {
        if !self.closed.is_cancelled() {
            debug!(buffered = self.len(), "Work queue shutting down");
        }
        self.closed.cancel();
    }

    /// Whether shutdown has been signaled.
    pub fn is_shut_down(&self) -> bool {
        self.closed.is_cancelled()
    }

    /// Snapshot of the number of buffered items.
    pub fn len(&self) -> usize {
        self.buf.lock().expect("queue lock poisoned").len()
    }

    /// Snapshot emptiness check.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The fixed capacity bound this queue was built with.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
