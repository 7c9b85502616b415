//! In-memory implementation of the stock ledger.

use crate::inventory::{Inventory, InventoryError};
use crate::model::ProductId;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, warn};

#[derive(Debug, Default, Clone, Copy)]
struct StockEntry {
    available: u32,
    reserved: u32,
}

/// Stock ledger guarded by a single mutex over the whole map.
///
/// Every mutation and every consistent read takes the lock for the full
/// compound span, so concurrent reservations for the same product can never
/// interleave between the check and the decrement. Counts are unsigned;
/// stock cannot go negative by construction.
#[derive(Debug, Default)]
pub struct InMemoryInventory {
    ledger: Mutex<HashMap<ProductId, StockEntry>>,
}

impl InMemoryInventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `quantity` units of available stock, creating the product entry
    /// if it does not exist yet.
    pub fn restock(&self, product: &ProductId, quantity: u32) {
        let mut ledger = self.ledger.lock().expect("inventory lock poisoned");
        let entry = ledger.entry(product.clone()).or_default();
        entry.available += quantity;
        debug!(product = %product, available = entry.available, "Restocked");
    }

    /// Units currently held by reservations, for inspection and tests.
    pub fn reserved(&self, product: &ProductId) -> u32 {
        self.ledger
            .lock()
            .expect("inventory lock poisoned")
            .get(product)
            .map(|entry| entry.reserved)
            .unwrap_or(0)
    }
}

impl Inventory for InMemoryInventory {
    fn has_stock(&self, product: &ProductId, quantity: u32) -> bool {
        self.available(product) >= quantity
    }

    fn reserve(&self, product: &ProductId, quantity: u32) -> Result<(), InventoryError> {
        let mut ledger = self.ledger.lock().expect("inventory lock poisoned");
        let entry = ledger
            .get_mut(product)
            .ok_or_else(|| InventoryError::UnknownProduct(product.clone()))?;
        if entry.available < quantity {
            return Err(InventoryError::InsufficientStock {
                product: product.clone(),
                requested: quantity,
                available: entry.available,
            });
        }
        entry.available -= quantity;
        entry.reserved += quantity;
        debug!(
            product = %product,
            quantity,
            available = entry.available,
            "Reserved stock"
        );
        Ok(())
    }

    fn release(&self, product: &ProductId, quantity: u32) {
        let mut ledger = self.ledger.lock().expect("inventory lock poisoned");
        let Some(entry) = ledger.get_mut(product) else {
            warn!(product = %product, quantity, "Release for unknown product ignored");
            return;
        };
        let returned = quantity.min(entry.reserved);
        if returned < quantity {
            warn!(
                product = %product,
                requested = quantity,
                reserved = entry.reserved,
                "Release exceeds reservation, clamping"
            );
        }
        entry.reserved -= returned;
        entry.available += returned;
        debug!(
            product = %product,
            quantity = returned,
            available = entry.available,
            "Released stock"
        );
    }

    fn commit(&self, product: &ProductId, quantity: u32) -> Result<(), InventoryError> {
        let mut ledger = self.ledger.lock().expect("inventory lock poisoned");
        let entry = ledger
            .get_mut(product)
            .ok_or_else(|| InventoryError::UnknownProduct(product.clone()))?;
        if entry.reserved < quantity {
            return Err(InventoryError::NoReservation {
                product: product.clone(),
                requested: quantity,
                reserved: entry.reserved,
            });
        }
        entry.reserved -= quantity;
        debug!(product = %product, quantity, "Committed reservation");
        Ok(())
    }

    fn available(&self, product: &ProductId) -> u32 {
        self.ledger
            .lock()
            .expect("inventory lock poisoned")
            .get(product)
            .map(|entry| entry.available)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn widget() -> ProductId {
        ProductId::new("widget")
    }

    #[test]
    fn reserve_moves_stock_and_failure_leaves_state_unchanged() {
        let inventory = InMemoryInventory::new();
        inventory.restock(&widget(), 10);

        inventory.reserve(&widget(), 4).unwrap();
        assert_eq!(inventory.available(&widget()), 6);
        assert_eq!(inventory.reserved(&widget()), 4);

        let err = inventory.reserve(&widget(), 7).unwrap_err();
        assert_eq!(
            err,
            InventoryError::InsufficientStock {
                product: widget(),
                requested: 7,
                available: 6,
            }
        );
        assert_eq!(inventory.available(&widget()), 6);
        assert_eq!(inventory.reserved(&widget()), 4);
    }

    #[test]
    fn reserve_unknown_product_fails() {
        let inventory = InMemoryInventory::new();
        assert_eq!(
            inventory.reserve(&widget(), 1).unwrap_err(),
            InventoryError::UnknownProduct(widget())
        );
    }

    #[test]
    fn release_returns_reserved_units() {
        let inventory = InMemoryInventory::new();
        inventory.restock(&widget(), 5);
        inventory.reserve(&widget(), 5).unwrap();

        inventory.release(&widget(), 5);
        assert_eq!(inventory.available(&widget()), 5);
        assert_eq!(inventory.reserved(&widget()), 0);
    }

    #[test]
    fn release_is_clamped_to_the_reservation() {
        let inventory = InMemoryInventory::new();
        inventory.restock(&widget(), 5);
        inventory.reserve(&widget(), 2).unwrap();

        inventory.release(&widget(), 4);
        assert_eq!(inventory.available(&widget()), 5);
        assert_eq!(inventory.reserved(&widget()), 0);
    }

    #[test]
    fn commit_requires_a_matching_reservation() {
        let inventory = InMemoryInventory::new();
        inventory.restock(&widget(), 5);
        inventory.reserve(&widget(), 3).unwrap();

        inventory.commit(&widget(), 3).unwrap();
        assert_eq!(inventory.reserved(&widget()), 0);
        assert_eq!(inventory.available(&widget()), 2);

        assert_eq!(
            inventory.commit(&widget(), 1).unwrap_err(),
            InventoryError::NoReservation {
                product: widget(),
                requested: 1,
                reserved: 0,
            }
        );
    }

    #[test]
    fn has_stock_is_a_snapshot_of_available_units() {
        let inventory = InMemoryInventory::new();
        assert!(!inventory.has_stock(&widget(), 1));
        inventory.restock(&widget(), 2);
        assert!(inventory.has_stock(&widget(), 2));
        assert!(!inventory.has_stock(&widget(), 3));
    }

    /// Ten concurrent single-unit reservations against stock 100: every one
    /// succeeds and exactly ten units are gone, regardless of interleaving.
    #[tokio::test]
    async fn concurrent_reservations_lose_no_updates() {
        let inventory = Arc::new(InMemoryInventory::new());
        inventory.restock(&widget(), 100);

        let mut handles = Vec::new();
        for _ in 0..10 {
            let inventory = inventory.clone();
            handles.push(tokio::spawn(async move {
                inventory.reserve(&widget(), 1)
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(inventory.available(&widget()), 90);
        assert_eq!(inventory.reserved(&widget()), 10);
    }

    /// Oversubscribed product: with stock S and N > S concurrent single-unit
    /// reservations, exactly S succeed and stock ends at zero.
    #[tokio::test]
    async fn oversubscription_grants_exactly_the_stock() {
        let inventory = Arc::new(InMemoryInventory::new());
        inventory.restock(&widget(), 10);

        let mut handles = Vec::new();
        for _ in 0..25 {
            let inventory = inventory.clone();
            handles.push(tokio::spawn(async move {
                inventory.reserve(&widget(), 1).is_ok()
            }));
        }

        let mut granted = 0;
        for handle in handles {
            if handle.await.unwrap() {
                granted += 1;
            }
        }
        assert_eq!(granted, 10);
        assert_eq!(inventory.available(&widget()), 0);
        assert_eq!(inventory.reserved(&widget()), 10);
    }
}
