//! # Payment
//!
//! The payment gateway is an external collaborator: it may be slow, it may
//! fail, and the core depends on nothing beyond "it eventually produces a
//! [`PaymentResult`](crate::model::PaymentResult) or can be cancelled".
//! Refund submission is assumed idempotent-safe on the gateway side — a
//! refund after a failed or partially-applied charge never double-charges.
//! That assumption is the gateway's to keep, not this crate's to enforce.
//!
//! [`PaymentProcessor`] wraps a gateway in the shared
//! [`TaskPool`](pipeline_core::TaskPool) so charges and refunds run off the
//! worker's critical path with a hard await deadline and best-effort
//! cancellation.
//!
//! ## Structure
//!
//! - [`gateway`] - the [`PaymentGateway`] contract and its request DTOs
//! - [`processor`] - pool-backed submission, [`PaymentAttempt`] handles
//! - [`simulator`] - in-process reference gateway for demos and tests
//! - [`error`] - [`PaymentError`]

pub mod error;
pub mod gateway;
pub mod processor;
pub mod simulator;

pub use error::PaymentError;
pub use gateway::{ChargeRequest, PaymentGateway, RefundRequest};
pub use processor::{PaymentAttempt, PaymentProcessor};
pub use simulator::SimulatedGateway;
