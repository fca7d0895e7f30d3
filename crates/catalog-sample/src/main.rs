//! # Reactive Catalog
//!
//! A product catalog built as a graph of cached streams on top of
//! [`reactive_framework`].
//!
//! ## Core Components
//!
//! - **[model]**: Records served by the stores ([`Product`](catalog_sample::model::Product),
//!   [`Category`](catalog_sample::model::Category), [`Supplier`](catalog_sample::model::Supplier))
//!   and the derived records the views show.
//! - **[services]**: Cached streams per collection, driven by action streams.
//! - **[components]**: Guarded, view-shaped streams plus the commands a UI calls.
//! - **[lifecycle]**: Configuration, seed data, startup and shutdown.
//!
//! ## Quick Start
//!
//! [`main`] walks through one session:
//! 1. Start the [`CatalogSystem`].
//! 2. Browse the list, filter it by category and add a product.
//! 3. Select a product and watch its detail view fill in.
//! 4. Compare the supplier join strategies.
//! 5. Break the products store and watch the error message arrive.
//!
//! ```bash
//! RUST_LOG=info cargo run -p catalog-sample
//! ```

use catalog_sample::components::{
    ProductDetailComponent, ProductListAltComponent, ProductListComponent,
};
use catalog_sample::lifecycle::{CatalogConfig, CatalogError, CatalogSystem};
use catalog_sample::model::{CategoryId, ProductId};
use catalog_sample::services::ProductService;
use reactive_framework::tracing::setup_tracing;
use reactive_framework::{FetchError, JoinStrategy, Stream, Subscription};
use std::rc::Rc;
use std::time::Duration;
use tokio::task::LocalSet;
use tracing::{info, info_span, warn, Instrument};

/// Lets spawned fetches finish.
async fn settle(config: &CatalogConfig) {
    tokio::time::sleep(config.fetch_latency() * 4 + Duration::from_millis(20)).await;
}

fn watch<T: 'static>(stream: &Stream<T>, log: impl Fn(T) + 'static) -> Subscription {
    stream.for_each(log)
}

async fn run() -> Result<(), CatalogError> {
    let config = CatalogConfig::from_env()?;
    info!(markup = config.price_markup, latency_ms = config.fetch_latency_ms, "Starting catalog");

    let system = CatalogSystem::new(config.clone());
    let mut subscriptions = Vec::new();

    async {
        let list = ProductListComponent::new(&system.products, &system.categories);
        subscriptions.push(watch(&list.products(), |products| {
            let names: Vec<_> = products.iter().map(|p| p.name().to_string()).collect();
            info!(?names, "Product list");
        }));
        subscriptions.push(watch(&list.error_message(), |message| warn!(%message, "List error")));
        settle(&config).await;

        list.on_selected(Some(CategoryId(3)));
        list.on_add(None);
        list.on_selected(None);
    }
    .instrument(info_span!("product_list"))
    .await;

    async {
        let alt = ProductListAltComponent::new(&system.products);
        let detail = ProductDetailComponent::new(&system.products);
        subscriptions.push(watch(&alt.vm(), |vm| {
            info!(
                products = vm.products.len(),
                selected = ?vm.selected_product.as_ref().map(|p| p.name().to_string()),
                "List view"
            );
        }));
        subscriptions.push(watch(&detail.vm(), |vm| {
            let suppliers: Vec<_> = vm.suppliers.iter().map(|s| s.name.clone()).collect();
            info!(title = %vm.page_title, ?suppliers, "Detail view");
        }));
        settle(&config).await;

        alt.on_selected(ProductId(5));
        alt.on_selected(ProductId(1));
        settle(&config).await;
    }
    .instrument(info_span!("product_detail"))
    .await;

    for strategy in [
        JoinStrategy::ConcatInOrder,
        JoinStrategy::MergeConcurrently,
        JoinStrategy::SwitchToLatest,
    ] {
        subscriptions.push(watch(&system.suppliers.suppliers_with(strategy), move |s| {
            info!(?strategy, supplier = %s.name, id = %s.id, "Supplier arrived");
        }));
        settle(&config).await;
    }

    async {
        system
            .product_client
            .inject_fault(Some(FetchError::status(500, "Internal Server Error")))
            .await?;

        // A fresh service refetches and hits the fault.
        let broken = ProductService::new(
            Rc::new(system.product_client.clone()),
            &system.categories,
            &system.suppliers,
            config.price_markup,
        );
        let list = ProductListComponent::new(&broken, &system.categories);
        subscriptions.push(watch(&list.error_message(), |message| {
            warn!(%message, "Shown to the user")
        }));
        subscriptions.push(watch(&list.products(), |_| {}));
        settle(&config).await;
        Ok::<(), CatalogError>(())
    }
    .instrument(info_span!("fault_injection"))
    .await?;

    for subscription in subscriptions {
        subscription.dispose();
    }
    system.shutdown().await?;

    info!("Catalog session completed");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), CatalogError> {
    setup_tracing();
    LocalSet::new().run_until(run()).await
}
