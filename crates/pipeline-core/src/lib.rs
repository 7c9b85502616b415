//! # Pipeline Core
//!
//! Generic building blocks for bounded producer/consumer pipelines in Rust.
//! This crate is domain-free: it knows nothing about orders, payments, or
//! inventory. It provides two primitives and the coordination glue between
//! them:
//!
//! 1. **[`WorkQueue<T>`]** — a bounded FIFO blocking queue with shutdown
//!    propagation. Producers suspend when the queue is full (backpressure),
//!    consumers suspend when it is empty, and `shutdown()` wakes every
//!    blocked party so the system can wind down without hanging.
//! 2. **[`TaskPool`]** — a fixed-size pool for fire-off async sub-tasks.
//!    `submit()` returns a [`TaskHandle`] that is both awaitable (with a
//!    deadline) and cancellable, so timeouts and cancellation are first-class
//!    operations rather than afterthoughts.
//!
//! ## Concurrency Model
//!
//! - Queue hand-off moves the item by value: once `dequeue` returns an item,
//!   the consumer owns it exclusively. Nothing in this crate ever aliases a
//!   dequeued item.
//! - The queue's internal buffer is guarded by its own lock, never shared
//!   with caller locks. Capacity and item availability are tracked with
//!   semaphores, so blocked producers and consumers park on a wait queue
//!   instead of busy-polling.
//! - Shutdown is carried by a `CancellationToken`. Cancellation is
//!   cooperative and level-triggered: signaling it is idempotent, and every
//!   blocking operation in this crate races it.
//!
//! ## Quick Start
//!
//! ```rust
//! use pipeline_core::{Dequeue, TaskPool, WorkQueue};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     // Bounded hand-off between a producer and a consumer.
//!     let queue = Arc::new(WorkQueue::new(8));
//!     queue.enqueue("job").await.unwrap();
//!
//!     let worker = {
//!         let queue = queue.clone();
//!         tokio::spawn(async move {
//!             while let Dequeue::Item(job) = queue.dequeue().await {
//!                 println!("processing {job}");
//!             }
//!         })
//!     };
//!
//!     // Bounded async sub-tasks with a deadline.
//!     let pool = TaskPool::new(4);
//!     let handle = pool.submit(async { 2 + 2 });
//!     assert_eq!(handle.await_result(Duration::from_secs(1)).await.unwrap(), 4);
//!
//!     queue.shutdown();
//!     worker.await.unwrap();
//! }
//! ```

pub mod error;
pub mod queue;
pub mod task;
pub mod tracing;

// Re-export core types for convenience
pub use error::{EnqueueError, TaskError};
pub use queue::{Dequeue, WorkQueue};
pub use task::{TaskHandle, TaskPool};
