//! # Order Pipeline
//!
//! A concurrent order-processing pipeline built on [`pipeline_core`]: a
//! bounded work queue feeds a fixed pool of worker tasks that drive each
//! order through inventory reservation, asynchronous payment, and shipping
//! preparation, with coordinated graceful shutdown.
//!
//! ## Core Components
//!
//! - **[`model`]**: Domain data — [`Order`](model::Order), its status
//!   lifecycle, and the producer-held [`OrderReceipt`](model::OrderReceipt).
//! - **[`inventory`]**: Thread-safe stock ledger with atomic
//!   reserve/commit/release operations.
//! - **[`payment`]**: The [`PaymentGateway`](payment::PaymentGateway)
//!   collaborator contract and the task-pool wrapper that makes charges
//!   awaitable with a deadline and cancellable.
//! - **[`catalog`]**: Product lookup used upstream of enqueue to price
//!   orders.
//! - **[`intake`]**: Producer-facing submission API.
//! - **[`worker`]**: The consumer loop and per-order state machine.
//! - **[`system`]**: The [`OrderSystem`](system::OrderSystem) supervisor that
//!   owns queue, workers, and payment pool, and coordinates shutdown.
//!
//! ## Data Flow
//!
//! Producers call [`OrderIntake::submit`](intake::OrderIntake::submit); the
//! intake prices the order against the catalog and enqueues it. Workers
//! dequeue in a loop; each dequeued order is owned exclusively by its worker
//! until it reaches a terminal status. The worker blocks on the payment
//! sub-task (with a hard deadline) while other workers continue
//! independently. The only externally observable effect of any failure is
//! the order's terminal status on its receipt.

pub mod catalog;
pub mod config;
pub mod intake;
pub mod inventory;
pub mod model;
pub mod payment;
pub mod system;
pub mod worker;

pub use config::PipelineConfig;
pub use intake::{OrderForm, OrderIntake, SubmitError};
pub use model::{Order, OrderId, OrderReceipt, OrderStatus, ProductId};
pub use system::{OrderSystem, ShutdownReport};
