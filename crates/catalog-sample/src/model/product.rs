//! # Products
//!
//! ## Remote Resource
//! [`Product`] is the record served by the products collection (`api/products`).
//! The views never show it directly; they go through two explicit transforms:
//!
//! 1. [`ProductListing::from_product`] applies the price markup and builds the search key
//! 2. [`ProductWithCategory::resolve`] attaches the category name

use crate::model::{Category, CategoryId, SupplierId};
use reactive_framework::Resource;
use serde::{Deserialize, Serialize};

use std::fmt::Display;

/// Type-safe identifier for Products.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductId(pub u32);

impl From<u32> for ProductId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub product_name: String,
    pub product_code: String,
    pub description: String,
    pub price: f64,
    pub category_id: CategoryId,
    pub quantity_in_stock: u32,
    #[serde(default)]
    pub supplier_ids: Vec<SupplierId>,
}

impl Resource for Product {
    type Id = ProductId;
    const COLLECTION: &'static str = "products";

    fn id(&self) -> ProductId {
        self.id
    }
}

/// A product as listed to the user: marked-up price and a search key.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListing {
    pub id: ProductId,
    pub product_name: String,
    pub product_code: String,
    pub description: String,
    pub price: f64,
    pub category_id: CategoryId,
    pub quantity_in_stock: u32,
    pub supplier_ids: Vec<SupplierId>,
    pub search_key: Vec<String>,
}

impl ProductListing {
    /// Multiplies the price by `markup` and keys the listing by product name.
    pub fn from_product(product: Product, markup: f64) -> Self {
        let search_key = vec![product.product_name.clone()];
        Self {
            id: product.id,
            product_name: product.product_name,
            product_code: product.product_code,
            description: product.description,
            price: product.price * markup,
            category_id: product.category_id,
            quantity_in_stock: product.quantity_in_stock,
            supplier_ids: product.supplier_ids,
            search_key,
        }
    }
}

/// A listing with its category name resolved.
///
/// `category` is `None` when no category with the listing's id exists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductWithCategory {
    #[serde(flatten)]
    pub listing: ProductListing,
    pub category: Option<String>,
}

impl ProductWithCategory {
    pub fn resolve(listing: ProductListing, categories: &[Category]) -> Self {
        let category = categories
            .iter()
            .find(|c| c.id == listing.category_id)
            .map(|c| c.name.clone());
        Self { listing, category }
    }

    pub fn id(&self) -> ProductId {
        self.listing.id
    }

    pub fn name(&self) -> &str {
        &self.listing.product_name
    }

    pub fn price(&self) -> f64 {
        self.listing.price
    }
}
