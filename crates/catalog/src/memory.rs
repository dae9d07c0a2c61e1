//! In-memory catalog store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use common::{ItemId, Money};
use tokio::sync::RwLock;

use crate::{CatalogError, CatalogItem, CatalogStore, Result};

#[derive(Debug, Default)]
struct InMemoryCatalogState {
    items: HashMap<ItemId, CatalogItem>,
    fail_on_get: bool,
    fail_decrement_for: Option<ItemId>,
}

/// In-memory catalog store for tests and the default server wiring.
///
/// Provides the same interface as the PostgreSQL implementation, plus
/// failure-injection switches so callers can exercise store-outage paths.
#[derive(Clone, Default)]
pub struct InMemoryCatalogStore {
    state: Arc<RwLock<InMemoryCatalogState>>,
}

impl InMemoryCatalogStore {
    /// Creates a new empty in-memory catalog store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures every read to fail, simulating a store outage.
    pub async fn set_fail_on_get(&self, fail: bool) {
        self.state.write().await.fail_on_get = fail;
    }

    /// Configures decrements of the given item to fail while others succeed.
    pub async fn set_fail_on_decrement_for(&self, item_id: impl Into<ItemId>) {
        self.state.write().await.fail_decrement_for = Some(item_id.into());
    }

    /// Returns the number of items stored.
    pub async fn item_count(&self) -> usize {
        self.state.read().await.items.len()
    }

    /// Returns the stored stock total for an item, if present.
    pub async fn quantity_of(&self, item_id: &ItemId) -> Option<u32> {
        self.state
            .read()
            .await
            .items
            .get(item_id)
            .map(|item| item.total_quantity)
    }

    /// Clears all items.
    pub async fn clear(&self) {
        self.state.write().await.items.clear();
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn get(&self, item_id: &ItemId) -> Result<Option<CatalogItem>> {
        let state = self.state.read().await;
        if state.fail_on_get {
            return Err(CatalogError::Unavailable("injected read failure".into()));
        }
        Ok(state.items.get(item_id).cloned())
    }

    async fn insert(&self, item: CatalogItem) -> Result<()> {
        let mut state = self.state.write().await;
        if state.items.contains_key(&item.id) {
            return Err(CatalogError::Duplicate(item.id));
        }
        state.items.insert(item.id.clone(), item);
        Ok(())
    }

    async fn update(&self, item: CatalogItem) -> Result<()> {
        let mut state = self.state.write().await;
        let existing = state
            .items
            .get_mut(&item.id)
            .ok_or_else(|| CatalogError::NotFound(item.id.clone()))?;
        existing.name = item.name;
        existing.price = item.price;
        existing.total_quantity = item.total_quantity;
        existing.updated_at = Utc::now();
        Ok(())
    }

    async fn set_quantity(&self, item_id: &ItemId, quantity: u32) -> Result<CatalogItem> {
        let mut state = self.state.write().await;
        let item = state
            .items
            .get_mut(item_id)
            .ok_or_else(|| CatalogError::NotFound(item_id.clone()))?;
        item.total_quantity = quantity;
        item.updated_at = Utc::now();
        Ok(item.clone())
    }

    async fn decrement_quantity(&self, item_id: &ItemId, amount: u32) -> Result<()> {
        let mut state = self.state.write().await;
        if state.fail_decrement_for.as_ref() == Some(item_id) {
            return Err(CatalogError::Unavailable(
                "injected decrement failure".into(),
            ));
        }
        let item = state
            .items
            .get_mut(item_id)
            .ok_or_else(|| CatalogError::NotFound(item_id.clone()))?;
        if item.total_quantity < amount {
            return Err(CatalogError::InsufficientQuantity {
                item_id: item_id.clone(),
                requested: amount,
                available: item.total_quantity,
            });
        }
        item.total_quantity -= amount;
        item.updated_at = Utc::now();
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<CatalogItem>> {
        let state = self.state.read().await;
        let mut items: Vec<_> = state.items.values().cloned().collect();
        items.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(items)
    }

    async fn search_by_name(&self, query: &str) -> Result<Vec<CatalogItem>> {
        let needle = query.to_lowercase();
        let state = self.state.read().await;
        let mut items: Vec<_> = state
            .items
            .values()
            .filter(|item| item.name.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        items.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(items)
    }

    async fn list_below_price(&self, max_price: Money) -> Result<Vec<CatalogItem>> {
        let state = self.state.read().await;
        let mut items: Vec<_> = state
            .items
            .values()
            .filter(|item| item.price < max_price)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(items)
    }
}
