//! Inventory service: catalog access with reservation holds applied.

use std::collections::HashMap;
use std::sync::Arc;

use catalog::{CatalogItem, CatalogStore};
use common::{ItemId, Money};
use serde::{Deserialize, Serialize};

use crate::{InventoryError, ReservationLedger, ReservationLine, Result};

/// A catalog item together with its sellable quantity.
///
/// `available` is the stock total minus units currently held in the
/// reservation ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemAvailability {
    /// The underlying catalog item.
    pub item: CatalogItem,
    /// Units that can still be reserved.
    pub available: u32,
}

/// Availability queries and the reserve/release/commit protocol.
///
/// The service owns the process-wide [`ReservationLedger`] and reads the
/// catalog through the store it was built with. Catalog I/O always happens
/// outside the ledger lock.
#[derive(Clone)]
pub struct InventoryService<C> {
    catalog: C,
    ledger: Arc<ReservationLedger>,
}

impl<C: CatalogStore> InventoryService<C> {
    /// Creates a new inventory service with an empty ledger.
    pub fn new(catalog: C) -> Self {
        Self {
            catalog,
            ledger: Arc::new(ReservationLedger::new()),
        }
    }

    /// Gets a reference to the backing catalog store.
    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Gets a reference to the reservation ledger.
    pub fn ledger(&self) -> &ReservationLedger {
        &self.ledger
    }

    fn to_availability(&self, item: CatalogItem) -> ItemAvailability {
        let held = self.ledger.held(&item.id);
        ItemAvailability {
            available: item.total_quantity.saturating_sub(held),
            item,
        }
    }

    /// Fetches one item with holds subtracted, or `None` if unknown.
    pub async fn item_view(&self, item_id: &ItemId) -> Result<Option<ItemAvailability>> {
        let item = self.catalog.get(item_id).await?;
        Ok(item.map(|item| self.to_availability(item)))
    }

    /// Returns every catalog item with holds subtracted.
    pub async fn list_available(&self) -> Result<Vec<ItemAvailability>> {
        let items = self.catalog.list_all().await?;
        Ok(items
            .into_iter()
            .map(|item| self.to_availability(item))
            .collect())
    }

    /// Case-insensitive name search with holds subtracted.
    pub async fn search(&self, query: &str) -> Result<Vec<ItemAvailability>> {
        let items = self.catalog.search_by_name(query).await?;
        Ok(items
            .into_iter()
            .map(|item| self.to_availability(item))
            .collect())
    }

    /// Items priced strictly below `max_price`, with holds subtracted.
    pub async fn list_below_price(&self, max_price: Money) -> Result<Vec<ItemAvailability>> {
        let items = self.catalog.list_below_price(max_price).await?;
        Ok(items
            .into_iter()
            .map(|item| self.to_availability(item))
            .collect())
    }

    /// Reserves every line in full, or none of them.
    ///
    /// Stock totals are read from the catalog first; only then is the
    /// ledger lock taken for the all-or-nothing admission check.
    #[tracing::instrument(skip(self, lines), fields(line_count = lines.len()))]
    pub async fn reserve(&self, lines: &[ReservationLine]) -> Result<()> {
        let mut totals: HashMap<ItemId, u32> = HashMap::new();
        for line in lines {
            let item = self
                .catalog
                .get(&line.item_id)
                .await?
                .ok_or_else(|| InventoryError::ItemUnavailable(line.item_id.clone()))?;
            totals.insert(line.item_id.clone(), item.total_quantity);
        }

        self.ledger.try_hold(lines, &totals)?;
        tracing::debug!(line_count = lines.len(), "reservation admitted");
        Ok(())
    }

    /// Releases the holds for the given lines.
    ///
    /// Never fails; excess quantities floor at zero in the ledger.
    pub fn release(&self, lines: &[ReservationLine]) {
        self.ledger.release(lines);
    }

    /// Turns held units into durable stock decrements, line by line.
    ///
    /// Each line's hold is released only after its catalog decrement
    /// succeeds. If a decrement fails the loop stops: earlier lines are
    /// already durable and hold-free, the failing line and everything
    /// after it stay held, and the returned error carries both lists. An
    /// error-level record with the same split is logged for
    /// reconciliation. No automatic repair is attempted.
    #[tracing::instrument(skip(self, lines), fields(line_count = lines.len()))]
    pub async fn commit(&self, lines: &[ReservationLine]) -> Result<()> {
        for (index, line) in lines.iter().enumerate() {
            if let Err(cause) = self
                .catalog
                .decrement_quantity(&line.item_id, line.quantity)
                .await
            {
                let committed = lines[..index].to_vec();
                let still_held = lines[index..].to_vec();
                tracing::error!(
                    failed_item = %line.item_id,
                    committed = ?committed,
                    still_held = ?still_held,
                    error = %cause,
                    "commit stopped partway; durable stock and ledger holds now disagree"
                );
                return Err(InventoryError::CommitIncomplete {
                    committed,
                    still_held,
                    failed_item: line.item_id.clone(),
                    source: cause,
                });
            }
            self.ledger.release(std::slice::from_ref(line));
        }
        tracing::debug!(line_count = lines.len(), "reservation committed");
        Ok(())
    }
}
