//! # Domain Model
//!
//! Immutable records served by the remote collections, plus the derived
//! records the views consume. Derived records are produced by explicit
//! transforms, never by mutating the originals.

pub mod category;
pub mod product;
pub mod supplier;

pub use category::*;
pub use product::*;
pub use supplier::*;
