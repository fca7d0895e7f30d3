//! Supplier lookups.
//!
//! Suppliers are never listed in bulk; they are fetched one by one from
//! `api/suppliers/{id}`. The `suppliers_with` family shows how each join
//! strategy sequences those per-id fetches over the configured demo ids.

use crate::model::{Supplier, SupplierId};
use reactive_framework::{JoinStrategy, RemoteFetcher, Stream};
use std::rc::Rc;
use tracing::debug;

#[derive(Clone)]
pub struct SupplierService {
    fetcher: Rc<dyn RemoteFetcher<Supplier>>,
    demo_ids: Vec<SupplierId>,
}

impl SupplierService {
    pub fn new(fetcher: Rc<dyn RemoteFetcher<Supplier>>, demo_ids: Vec<SupplierId>) -> Self {
        Self { fetcher, demo_ids }
    }

    /// One supplier.
    pub fn supplier(&self, id: SupplierId) -> Stream<Supplier> {
        self.fetcher.fetch_one(id)
    }

    /// Every supplier in `ids`, fetched one at a time and collected in `ids` order.
    pub fn suppliers_of(&self, ids: Vec<SupplierId>) -> Stream<Vec<Supplier>> {
        let service = self.clone();
        Stream::from_iter(ids)
            .concat_in_order(move |id| service.supplier(id))
            .collect()
    }

    /// The demo ids mapped to unflattened fetch streams. Nothing is fetched
    /// until an inner stream is subscribed.
    pub fn supplier_requests(&self) -> Stream<Stream<Supplier>> {
        let service = self.clone();
        Stream::from_iter(self.demo_ids.clone()).map(move |id| service.supplier(id))
    }

    /// The demo ids flattened through `strategy`.
    pub fn suppliers_with(&self, strategy: JoinStrategy) -> Stream<Supplier> {
        let service = self.clone();
        Stream::from_iter(self.demo_ids.clone())
            .tap(move |id| debug!(?strategy, %id, "supplier source"))
            .flat_map_with(strategy, move |id| service.supplier(id))
    }
}
