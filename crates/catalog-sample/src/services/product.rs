//! # Product Service
//!
//! Owns the product stream graph. Every named stream is built once, at
//! construction, and exposed as a cached [`Stream`]:
//!
//! | Stream | Built from |
//! |--------|------------|
//! | [`products`](ProductService::products) | `api/products`, price markup, search key |
//! | [`products_with_category`](ProductService::products_with_category) | products + categories |
//! | [`products_with_add`](ProductService::products_with_add) | the above, plus locally inserted products |
//! | [`selected_product`](ProductService::selected_product) | products with category + the selection action |
//! | [`selected_product_suppliers`](ProductService::selected_product_suppliers) | the selection, switching to its supplier fetches |
//!
//! Errors are not handled here; each component guards the streams it shows.

use crate::model::{
    Category, CategoryId, Product, ProductId, ProductListing, ProductWithCategory, Supplier,
};
use crate::services::{CategoryService, SupplierService};
use reactive_framework::{combine_latest2, ActionStream, RemoteFetcher, Stream};
use std::rc::Rc;
use tracing::{debug, info};

#[derive(Clone)]
pub struct ProductService {
    products: Stream<Vec<ProductListing>>,
    products_with_category: Stream<Vec<ProductWithCategory>>,
    products_with_add: Stream<Vec<ProductWithCategory>>,
    selected_product: Stream<Option<ProductWithCategory>>,
    selected_product_suppliers: Stream<Vec<Supplier>>,
    selection: ActionStream<Option<ProductId>>,
    /// Every locally added product so far, oldest first.
    inserted: ActionStream<Vec<Product>>,
}

impl ProductService {
    pub fn new(
        fetcher: Rc<dyn RemoteFetcher<Product>>,
        categories: &CategoryService,
        suppliers: &SupplierService,
        markup: f64,
    ) -> Self {
        let selection = ActionStream::with_initial(None);
        let inserted = ActionStream::with_initial(Vec::new());

        let products = fetcher
            .fetch_all()
            .map(move |products| {
                products
                    .into_iter()
                    .map(|product| ProductListing::from_product(product, markup))
                    .collect::<Vec<_>>()
            })
            .tap(|products| info!(count = products.len(), "Products loaded"))
            .share_replay();

        let categories = categories.categories();
        let products_with_category = combine_latest2(&products, &categories)
            .map(|(products, categories)| {
                products
                    .into_iter()
                    .map(|listing| ProductWithCategory::resolve(listing, &categories))
                    .collect::<Vec<_>>()
            })
            .share_replay();

        // Rebuilt from the full insert list, so a reconnect sees the same list.
        let insertions = combine_latest2(&inserted.stream(), &categories).map(
            move |(added, categories): (Vec<Product>, Vec<Category>)| {
                added
                    .into_iter()
                    .map(|product| {
                        ProductWithCategory::resolve(
                            ProductListing::from_product(product, markup),
                            &categories,
                        )
                    })
                    .collect::<Vec<_>>()
            },
        );
        let products_with_add = combine_latest2(&products_with_category, &insertions)
            .map(|(mut products, added)| {
                products.extend(added);
                products
            })
            .share_replay();

        let selected_product = combine_latest2(&products_with_category, &selection.stream())
            .map(|(products, selected)| {
                selected.and_then(|id| products.into_iter().find(|p| p.id() == id))
            })
            .tap(|selected| debug!(product = ?selected.as_ref().map(|p| p.id()), "selectedProduct"))
            .share_replay();

        let selected_product_suppliers = {
            let suppliers = suppliers.clone();
            selected_product
                .switch_to_latest(move |selected| match selected {
                    Some(product) => suppliers.suppliers_of(product.listing.supplier_ids),
                    None => Stream::of(Vec::new()),
                })
                .share_replay()
        };

        Self {
            products,
            products_with_category,
            products_with_add,
            selected_product,
            selected_product_suppliers,
            selection,
            inserted,
        }
    }

    /// `products$`: listings with marked-up prices.
    pub fn products(&self) -> Stream<Vec<ProductListing>> {
        self.products.clone()
    }

    /// `productsWithCategory$`.
    pub fn products_with_category(&self) -> Stream<Vec<ProductWithCategory>> {
        self.products_with_category.clone()
    }

    /// `productsWithAdd$`: the loaded list with local insertions appended.
    pub fn products_with_add(&self) -> Stream<Vec<ProductWithCategory>> {
        self.products_with_add.clone()
    }

    /// `selectedProduct$`: `None` while nothing (or an unknown id) is selected.
    pub fn selected_product(&self) -> Stream<Option<ProductWithCategory>> {
        self.selected_product.clone()
    }

    /// `selectedProductSuppliers$`: suppliers of the current selection only.
    pub fn selected_product_suppliers(&self) -> Stream<Vec<Supplier>> {
        self.selected_product_suppliers.clone()
    }

    /// Changes the current selection.
    pub fn select_product(&self, id: Option<ProductId>) {
        info!(product_id = ?id, "Product selected");
        self.selection.emit(id);
    }

    /// Appends `product` (or a sample product when `None`) to the local list.
    pub fn add_product(&self, product: Option<Product>) {
        let product = product.unwrap_or_else(sample_product);
        info!(product_id = %product.id, "Product added locally");
        let mut added = self.inserted.value().unwrap_or_default();
        added.push(product);
        self.inserted.emit(added);
    }
}

/// The product inserted when `add_product` gets no item.
pub fn sample_product() -> Product {
    Product {
        id: ProductId(42),
        product_name: "Another One".to_string(),
        product_code: "TBX-0042".to_string(),
        description: "Our new product".to_string(),
        price: 8.9,
        category_id: CategoryId(3),
        quantity_in_stock: 30,
        supplier_ids: Vec::new(),
    }
}
