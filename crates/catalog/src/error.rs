use common::ItemId;
use thiserror::Error;

/// Errors that can occur when interacting with the catalog store.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The item does not exist in the catalog.
    #[error("Item not found: {0}")]
    NotFound(ItemId),

    /// An item with the same ID already exists.
    #[error("Duplicate item: {0}")]
    Duplicate(ItemId),

    /// A decrement would take the stored quantity below zero.
    #[error("Insufficient quantity for {item_id}: requested {requested}, available {available}")]
    InsufficientQuantity {
        item_id: ItemId,
        requested: u32,
        available: u32,
    },

    /// The store could not be reached or refused the operation.
    #[error("Catalog store unavailable: {0}")]
    Unavailable(String),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Result type for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;
