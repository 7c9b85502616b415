//! Error types for inventory operations.

use crate::model::ProductId;
use thiserror::Error;

/// Errors that can occur during ledger operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum InventoryError {
    /// The product has never been stocked.
    #[error("Unknown product: {0}")]
    UnknownProduct(ProductId),

    /// The requested quantity exceeds the available stock.
    #[error("Insufficient stock for {product}: requested {requested}, available {available}")]
    InsufficientStock {
        product: ProductId,
        requested: u32,
        available: u32,
    },

    /// A commit was attempted for more units than are reserved.
    #[error("No matching reservation for {product}: requested {requested}, reserved {reserved}")]
    NoReservation {
        product: ProductId,
        requested: u32,
        reserved: u32,
    },
}
