use reactive_framework::Resource;
use serde::{Deserialize, Serialize};

use std::fmt::Display;

/// Type-safe identifier for Suppliers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SupplierId(pub u32);

impl From<u32> for SupplierId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl Display for SupplierId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A supplier, fetched one at a time from `api/suppliers/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: SupplierId,
    pub name: String,
    pub cost: f64,
    pub minimum_quantity: u32,
}

impl Resource for Supplier {
    type Id = SupplierId;
    const COLLECTION: &'static str = "suppliers";

    fn id(&self) -> SupplierId {
        self.id
    }
}
