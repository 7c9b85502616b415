//! Tracing bootstrap shared by binaries and integration tests.

/// Initializes the tracing/logging infrastructure for the application.
///
/// Structured logging via the `tracing` crate with environment-based
/// filtering: set `RUST_LOG` to control verbosity.
///
/// - `RUST_LOG=info` - lifecycle events and state transitions
/// - `RUST_LOG=debug` - full payloads and per-item detail
/// - `RUST_LOG=order_pipeline=debug` - debug for one crate only
///
/// # Example
///
/// ```ignore
/// setup_tracing();
/// tracing::info!("Application started");
/// ```
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}
