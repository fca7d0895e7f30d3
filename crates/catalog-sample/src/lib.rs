//! # Catalog Sample Library
//!
//! This library exposes the catalog's modules for integration testing.

pub mod components;
pub mod lifecycle;
pub mod model;
pub mod services;
