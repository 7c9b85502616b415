//! # Inventory
//!
//! Thread-safe stock ledger shared by all workers, behind the [`Inventory`]
//! capability trait so tests can substitute failing stubs at the same seam.
//!
//! ## The Reservation Contract
//!
//! The load-bearing operation is [`Inventory::reserve`]: the stock check and
//! the decrement execute as one indivisible critical section. It is not
//! legal for two concurrent callers to both observe sufficient stock and
//! both decrement past it. Synchronizing only the container is not enough —
//! the whole check-then-decrement span must hold the lock. [`has_stock`] is
//! deliberately weaker: a snapshot that may be stale by the time a
//! reservation is attempted, usable only for fast-fail UX.
//!
//! Reserved units are tracked separately from available ones so the two
//! later stages have real bookkeeping to do: [`Inventory::commit`] retires a
//! reservation once the order ships, and [`Inventory::release`] returns it
//! to available stock when a later pipeline stage fails.
//!
//! [`has_stock`]: Inventory::has_stock

pub mod error;
pub mod ledger;

pub use error::InventoryError;
pub use ledger::InMemoryInventory;

use crate::model::ProductId;

/// Capability interface over the stock ledger.
///
/// All operations are atomic with respect to each other; implementations
/// must never expose an intermediate state of a compound update.
pub trait Inventory: Send + Sync + 'static {
    /// Non-authoritative snapshot check.
    ///
    /// May be stale by the time a reservation is attempted; callers must
    /// not rely on it for correctness.
    fn has_stock(&self, product: &ProductId, quantity: u32) -> bool;

    /// Atomically checks availability and moves `quantity` units from
    /// available to reserved. On failure the ledger is left unchanged.
    fn reserve(&self, product: &ProductId, quantity: u32) -> Result<(), InventoryError>;

    /// Compensation path: atomically returns `quantity` reserved units to
    /// available stock. Mismatches are logged, never fatal.
    fn release(&self, product: &ProductId, quantity: u32);

    /// Retires `quantity` reserved units once the order is paid and bound
    /// for shipping. Fails if no matching reservation exists.
    fn commit(&self, product: &ProductId, quantity: u32) -> Result<(), InventoryError>;

    /// Atomic read of currently available stock.
    fn available(&self, product: &ProductId) -> u32;
}
