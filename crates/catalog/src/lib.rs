//! Catalog storage for the storefront order pipeline.
//!
//! The catalog is the authoritative record of items and their stock totals.
//! [`CatalogStore`] is the seam the rest of the pipeline talks through:
//! [`InMemoryCatalogStore`] backs tests and the default server wiring,
//! [`PostgresCatalogStore`] backs durable deployments, and [`import`] loads
//! items in bulk from delimited text.

pub mod error;
pub mod import;
pub mod item;
pub mod memory;
pub mod postgres;
pub mod store;

pub use error::{CatalogError, Result};
pub use import::{DuplicatePolicy, ImportOptions, ImportReport, RowError, import_csv};
pub use item::CatalogItem;
pub use memory::InMemoryCatalogStore;
pub use postgres::PostgresCatalogStore;
pub use store::CatalogStore;
