//! Core business logic - the concurrent catalog and everything that reads it.

/// Concurrent product ↔ review store
pub mod catalog;
/// Startup (restore / bulk load) and flush-on-shutdown
pub mod lifecycle;
/// Supported locales and text rendering
pub mod locale;
/// Composable product comparators
pub mod ordering;
/// Product reports and listings
pub mod report;

pub use catalog::{Catalog, CatalogEntry};
pub use lifecycle::{CatalogSource, flush_catalog, open_catalog};
pub use locale::Locale;
