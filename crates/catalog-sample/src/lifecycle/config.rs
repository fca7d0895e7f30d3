//! Runtime settings of the catalog.
//!
//! Defaults match the demo backend. A JSON document may override any subset of
//! fields, and a few fields can be overridden from the environment:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `CATALOG_PRICE_MARKUP` | `price_markup` |
//! | `CATALOG_FETCH_LATENCY_MS` | `fetch_latency_ms` |
//! | `CATALOG_STORE_BUFFER` | `store_buffer` |

use super::CatalogError;
use crate::model::SupplierId;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CatalogConfig {
    pub products_url: String,
    pub categories_url: String,
    pub suppliers_url: String,
    /// Factor applied to every listed price.
    pub price_markup: f64,
    /// Simulated latency of each remote fetch.
    pub fetch_latency_ms: u64,
    /// Request channel capacity of each store.
    pub store_buffer: usize,
    /// Suppliers used by the join strategy demos.
    pub demo_supplier_ids: Vec<SupplierId>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            products_url: "api/products".to_string(),
            categories_url: "api/categories".to_string(),
            suppliers_url: "api/suppliers".to_string(),
            price_markup: 1.5,
            fetch_latency_ms: 0,
            store_buffer: 32,
            demo_supplier_ids: vec![SupplierId(1), SupplierId(5), SupplierId(8)],
        }
    }
}

impl CatalogConfig {
    /// Defaults with environment overrides applied.
    pub fn from_env() -> Result<Self, CatalogError> {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Parses a JSON document; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Applies overrides looked up by variable name.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, CatalogError> {
        if let Some(markup) = parse(&lookup, "CATALOG_PRICE_MARKUP")? {
            self.price_markup = markup;
        }
        if let Some(latency) = parse(&lookup, "CATALOG_FETCH_LATENCY_MS")? {
            self.fetch_latency_ms = latency;
        }
        if let Some(buffer) = parse::<usize>(&lookup, "CATALOG_STORE_BUFFER")? {
            if buffer == 0 {
                return Err(CatalogError::Config {
                    key: "CATALOG_STORE_BUFFER".to_string(),
                    value: buffer.to_string(),
                });
            }
            self.store_buffer = buffer;
        }
        Ok(self)
    }

    pub fn fetch_latency(&self) -> Duration {
        Duration::from_millis(self.fetch_latency_ms)
    }
}

fn parse<V: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<V>, CatalogError> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| CatalogError::Config {
                key: key.to_string(),
                value: raw,
            }),
    }
}
