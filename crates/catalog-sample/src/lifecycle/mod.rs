//! # System Lifecycle
//!
//! Starts, wires and stops the catalog.
//!
//! ## Wiring
//!
//! [`CatalogSystem::new`] builds everything in dependency order:
//!
//! 1. **Stores**: one [`ResourceStore`](reactive_framework::ResourceStore) task per
//!    collection, seeded from [`seed`]
//! 2. **Clients**: pointed at the configured locators, with the configured latency
//! 3. **Services**: categories and suppliers first, then products, which read both
//!
//! Components are built by the caller from the services, so a test can build
//! only the component it looks at.
//!
//! ## Graceful Shutdown
//!
//! Stores stop when their last client is dropped:
//!
//! 1. **Drop components** held by the caller
//! 2. **[`CatalogSystem::shutdown`]** drops the services and clients
//! 3. **Stores detect closure**: `receiver.recv()` returns `None`
//! 4. **Await completion** of every store task
//!
//! ## Configuration
//!
//! [`CatalogConfig`] holds the locators, price markup, simulated latency and
//! store buffer size. See [`CatalogConfig::from_env`] for the overrides.

pub mod catalog_system;
pub mod config;
pub mod error;
pub mod seed;

pub use catalog_system::*;
pub use config::*;
pub use error::*;
