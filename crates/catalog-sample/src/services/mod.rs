//! # Services
//!
//! One service per remote collection. A service owns the cached streams for its
//! collection and the action streams that drive them; components only read
//! those streams and call the service's commands.

pub mod category;
pub mod product;
pub mod supplier;

pub use category::CategoryService;
pub use product::{sample_product, ProductService};
pub use supplier::SupplierService;
