//! # Observability & Tracing
//!
//! Structured logging for the stream graph and the resource stores.
//!
//! ## What Gets Traced
//!
//! - **Stores**: startup, every request (`Listed`, `Get`, `Inserted`), injected faults, shutdown
//! - **Fetches**: each `GET {locator}` as it is sent
//! - **Caches**: upstream connects and disconnects, cached failures
//! - **Joins**: abandoned inner streams when switching, dropped stale results (`trace`)
//! - **Errors**: every failure reported to a view's message channel (`warn`)
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run -p catalog-sample
//! RUST_LOG=debug cargo run -p catalog-sample
//! RUST_LOG=reactive_framework=trace cargo run -p catalog-sample
//! ```
//!
//! With `RUST_LOG=info` a run reads like:
//!
//! ```text
//! INFO Store started collection="products" size=5
//! INFO Listed collection="products" size=5
//! INFO Listed collection="categories" size=3
//! INFO Products loaded count=5
//! ```

/// Installs a compact `fmt` subscriber filtered by `RUST_LOG`.
///
/// Call once at startup; a second call panics.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false) // collection fields identify the source
        .compact()
        .init();
}
