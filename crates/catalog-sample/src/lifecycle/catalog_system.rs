use super::{seed, CatalogConfig, CatalogError};
use crate::model::{Category, Product, Supplier};
use crate::services::{CategoryService, ProductService, SupplierService};
use reactive_framework::{ResourceClient, ResourceStore};
use std::rc::Rc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// How long `shutdown` waits for the stores to drain.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// The running catalog: one store task per collection, their clients, and
/// the services built on top of them.
///
/// Must be created inside a Tokio runtime. Services are `!Send`, so the
/// streams they expose are subscribed from a `LocalSet`.
pub struct CatalogSystem {
    pub config: CatalogConfig,
    pub product_client: ResourceClient<Product>,
    pub category_client: ResourceClient<Category>,
    pub supplier_client: ResourceClient<Supplier>,
    pub categories: CategoryService,
    pub suppliers: SupplierService,
    pub products: ProductService,
    handles: Vec<JoinHandle<()>>,
}

impl CatalogSystem {
    /// Starts the stores seeded with the demo data.
    pub fn new(config: CatalogConfig) -> Self {
        Self::with_seed(config, seed::products(), seed::categories(), seed::suppliers())
    }

    pub fn with_seed(
        config: CatalogConfig,
        products: Vec<Product>,
        categories: Vec<Category>,
        suppliers: Vec<Supplier>,
    ) -> Self {
        let latency = config.fetch_latency();

        let (product_store, product_client) = ResourceStore::new(config.store_buffer, products);
        let (category_store, category_client) = ResourceStore::new(config.store_buffer, categories);
        let (supplier_store, supplier_client) = ResourceStore::new(config.store_buffer, suppliers);

        let product_client = product_client
            .with_locator(config.products_url.clone())
            .with_latency(latency);
        let category_client = category_client
            .with_locator(config.categories_url.clone())
            .with_latency(latency);
        let supplier_client = supplier_client
            .with_locator(config.suppliers_url.clone())
            .with_latency(latency);

        let handles = vec![
            tokio::spawn(product_store.run()),
            tokio::spawn(category_store.run()),
            tokio::spawn(supplier_store.run()),
        ];

        let categories = CategoryService::new(Rc::new(category_client.clone()));
        let suppliers = SupplierService::new(
            Rc::new(supplier_client.clone()),
            config.demo_supplier_ids.clone(),
        );
        let products = ProductService::new(
            Rc::new(product_client.clone()),
            &categories,
            &suppliers,
            config.price_markup,
        );

        info!(
            products = %config.products_url,
            categories = %config.categories_url,
            suppliers = %config.suppliers_url,
            "Catalog started"
        );

        Self {
            config,
            product_client,
            category_client,
            supplier_client,
            categories,
            suppliers,
            products,
            handles,
        }
    }

    /// Drops every client and waits for the stores to stop.
    ///
    /// Components hold service clones, which hold clients; drop them first or
    /// the stores keep running until the grace period runs out.
    pub async fn shutdown(self) -> Result<(), CatalogError> {
        let Self {
            product_client,
            category_client,
            supplier_client,
            categories,
            suppliers,
            products,
            handles,
            ..
        } = self;
        drop((products, suppliers, categories));
        drop((product_client, category_client, supplier_client));

        for handle in handles {
            match tokio::time::timeout(SHUTDOWN_GRACE, handle).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => return Err(CatalogError::Shutdown(e.to_string())),
                Err(_) => {
                    warn!("Store still has open clients");
                    return Err(CatalogError::Shutdown(
                        "a store did not stop; a client is still alive".to_string(),
                    ));
                }
            }
        }
        info!("Catalog stopped");
        Ok(())
    }
}
