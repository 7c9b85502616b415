//! # Order Pipeline Demo
//!
//! A reference run of the concurrent order-processing pipeline.
//!
//! ## 🚀 Core Components
//!
//! - **[`system`](order_pipeline::system)**: The [`OrderSystem`] supervisor that owns the queue, workers, and payment pool.
//! - **[`intake`](order_pipeline::intake)**: Producer-facing submission handle.
//! - **[`inventory`](order_pipeline::inventory)**: Thread-safe stock ledger with atomic reservations.
//! - **[`payment`](order_pipeline::payment)**: Gateway collaborator wrapped in a bounded, cancellable task pool.
//!
//! ## 📚 Quick Start
//!
//! The entry point below demonstrates:
//! 1.  Stocking the inventory and catalog.
//! 2.  Submitting a batch of orders through the intake.
//! 3.  Awaiting each receipt's terminal status.
//! 4.  Shutting the system down gracefully.
//!
//! ## 🧪 Testing
//!
//! See [`SimulatedGateway`](order_pipeline::payment::SimulatedGateway) for
//! exercising decline, timeout, and refund paths without a real gateway.

use order_pipeline::catalog::InMemoryCatalog;
use order_pipeline::inventory::{InMemoryInventory, Inventory};
use order_pipeline::payment::SimulatedGateway;
use order_pipeline::{OrderForm, OrderSystem, PipelineConfig, ProductId};
use pipeline_core::tracing::setup_tracing;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn, Instrument};

#[tokio::main]
async fn main() -> Result<(), String> {
    // Setup tracing once for the entire application
    setup_tracing();

    info!("Starting order pipeline demo");

    let inventory = Arc::new(InMemoryInventory::new());
    inventory.restock(&ProductId::new("widget"), 12);
    inventory.restock(&ProductId::new("gizmo"), 2);

    let catalog = Arc::new(
        InMemoryCatalog::new()
            .with_product(ProductId::new("widget"), "Widget", 19.99)
            .with_product(ProductId::new("gizmo"), "Gizmo", 45.50),
    );

    let gateway = Arc::new(SimulatedGateway::approving(Duration::from_millis(150)));

    let system = OrderSystem::new(
        PipelineConfig::from_env(),
        inventory.clone(),
        catalog,
        gateway,
    );
    let intake = system.intake();

    // A batch of orders. The two gizmo orders oversubscribe the stock of 2,
    // so whichever reserves second fails at the reservation stage.
    let forms = vec![
        OrderForm {
            product_id: ProductId::new("widget"),
            quantity: 5,
            idempotency_key: Some("demo-1".to_string()),
        },
        OrderForm {
            product_id: ProductId::new("widget"),
            quantity: 4,
            idempotency_key: Some("demo-2".to_string()),
        },
        OrderForm {
            product_id: ProductId::new("gizmo"),
            quantity: 1,
            idempotency_key: Some("demo-3".to_string()),
        },
        OrderForm {
            product_id: ProductId::new("gizmo"),
            quantity: 2,
            idempotency_key: Some("demo-4".to_string()),
        },
    ];

    let span = tracing::info_span!("order_submission");
    let receipts = async {
        let mut receipts = Vec::new();
        for form in forms {
            info!(product = %form.product_id, quantity = form.quantity, "Submitting order");
            let receipt = intake.submit(form).await.map_err(|e| e.to_string())?;
            receipts.push(receipt);
        }
        Ok::<_, String>(receipts)
    }
    .instrument(span)
    .await?;

    for mut receipt in receipts {
        let status = receipt.wait_terminal().await;
        info!(order = %receipt.id(), ?status, "Order settled");
    }

    info!(
        widgets = inventory.available(&ProductId::new("widget")),
        gizmos = inventory.available(&ProductId::new("gizmo")),
        "Remaining stock"
    );

    // Shutdown system gracefully
    let report = system.shutdown().await;
    if !report.is_clean() {
        warn!(
            undrained = report.undrained,
            stalled_workers = report.stalled_workers,
            "Shutdown left work behind"
        );
    }

    info!("Demo completed");
    Ok(())
}
