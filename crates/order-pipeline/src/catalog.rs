//! Product catalog collaborator.
//!
//! Consulted upstream of enqueue to price an order; never inside the worker
//! loop. Stock is the [`Inventory`](crate::inventory::Inventory)'s business,
//! not the catalog's.

use crate::model::ProductId;
use std::collections::HashMap;

/// What the catalog knows about a product.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductInfo {
    pub name: String,
    /// Unit price; an order's total is `price * quantity`.
    pub price: f64,
}

/// Lookup contract for product existence and pricing.
pub trait ProductCatalog: Send + Sync + 'static {
    fn lookup(&self, product: &ProductId) -> Option<ProductInfo>;
}

/// Immutable in-memory catalog, built once at startup.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    entries: HashMap<ProductId, ProductInfo>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_product(
        mut self,
        product: ProductId,
        name: impl Into<String>,
        price: f64,
    ) -> Self {
        self.entries.insert(
            product,
            ProductInfo {
                name: name.into(),
                price,
            },
        );
        self
    }
}

impl ProductCatalog for InMemoryCatalog {
    fn lookup(&self, product: &ProductId) -> Option<ProductInfo> {
        self.entries.get(product).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_finds_known_products_only() {
        let catalog = InMemoryCatalog::new().with_product(ProductId::new("widget"), "Widget", 19.99);

        let info = catalog.lookup(&ProductId::new("widget")).unwrap();
        assert_eq!(info.name, "Widget");
        assert_eq!(info.price, 19.99);
        assert!(catalog.lookup(&ProductId::new("gizmo")).is_none());
    }
}
