//! Catalog store trait.

use async_trait::async_trait;
use common::{ItemId, Money};

use crate::{CatalogItem, Result};

/// Storage seam for the item catalog.
///
/// List and search results are ordered by item ID so callers see
/// deterministic output regardless of the backing store.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Fetches a single item, or `None` if the ID is unknown.
    async fn get(&self, item_id: &ItemId) -> Result<Option<CatalogItem>>;

    /// Adds a new item. Fails with [`CatalogError::Duplicate`] if the ID is
    /// already taken.
    ///
    /// [`CatalogError::Duplicate`]: crate::CatalogError::Duplicate
    async fn insert(&self, item: CatalogItem) -> Result<()>;

    /// Replaces the name, price, and quantity of an existing item.
    ///
    /// `created_at` is preserved and `updated_at` is refreshed by the store.
    async fn update(&self, item: CatalogItem) -> Result<()>;

    /// Sets an item's stock total directly, returning the updated item.
    async fn set_quantity(&self, item_id: &ItemId, quantity: u32) -> Result<CatalogItem>;

    /// Durably subtracts `amount` units from an item's stock total.
    ///
    /// Fails with [`CatalogError::InsufficientQuantity`] rather than going
    /// below zero.
    ///
    /// [`CatalogError::InsufficientQuantity`]: crate::CatalogError::InsufficientQuantity
    async fn decrement_quantity(&self, item_id: &ItemId, amount: u32) -> Result<()>;

    /// Returns every item in the catalog.
    async fn list_all(&self) -> Result<Vec<CatalogItem>>;

    /// Returns items whose name contains `query`, case-insensitively.
    async fn search_by_name(&self, query: &str) -> Result<Vec<CatalogItem>>;

    /// Returns items priced strictly below `max_price`.
    async fn list_below_price(&self, max_price: Money) -> Result<Vec<CatalogItem>>;
}
