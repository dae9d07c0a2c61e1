//! Process-wide reservation ledger.

use std::collections::HashMap;
use std::sync::RwLock;

use common::ItemId;
use serde::{Deserialize, Serialize};

use crate::error::InventoryError;

/// One line of a reservation request: an item and how many units to hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationLine {
    /// The item to hold.
    pub item_id: ItemId,
    /// Units to hold.
    pub quantity: u32,
}

impl ReservationLine {
    /// Creates a new reservation line.
    pub fn new(item_id: impl Into<ItemId>, quantity: u32) -> Self {
        Self {
            item_id: item_id.into(),
            quantity,
        }
    }
}

/// In-flight holds per item, keyed by item ID.
///
/// The map is guarded by a single lock and every operation completes
/// without doing I/O while holding it. Entries are removed as soon as a
/// hold count reaches zero, so an empty map means no units are reserved
/// anywhere in the process.
#[derive(Debug, Default)]
pub struct ReservationLedger {
    holds: RwLock<HashMap<ItemId, u32>>,
}

impl ReservationLedger {
    /// Creates a new empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Admits a reservation request in full, or not at all.
    ///
    /// `totals` carries the stock total per item as read from the catalog
    /// by the caller, outside this lock. Both passes, the availability
    /// check and the hold bump, run under one write acquisition so no
    /// interleaved request can observe a half-admitted state. Lines
    /// repeating an item ID are accumulated during the check pass and
    /// cannot over-admit together.
    pub fn try_hold(
        &self,
        lines: &[ReservationLine],
        totals: &HashMap<ItemId, u32>,
    ) -> Result<(), InventoryError> {
        let mut holds = self.holds.write().unwrap();

        // Check pass: nothing is mutated until every line fits.
        let mut pending: HashMap<&ItemId, u32> = HashMap::new();
        for line in lines {
            let total = totals
                .get(&line.item_id)
                .copied()
                .ok_or_else(|| InventoryError::ItemUnavailable(line.item_id.clone()))?;
            let held = holds.get(&line.item_id).copied().unwrap_or(0);
            let pending_for_item = pending.entry(&line.item_id).or_insert(0);

            let wanted = u64::from(*pending_for_item) + u64::from(line.quantity);
            if u64::from(held) + wanted > u64::from(total) {
                return Err(InventoryError::InsufficientStock {
                    item_id: line.item_id.clone(),
                    requested: line.quantity,
                    available: total.saturating_sub(held).saturating_sub(*pending_for_item),
                });
            }
            // wanted <= total here, so it fits back into u32.
            *pending_for_item = wanted as u32;
        }

        // Apply pass.
        for (item_id, quantity) in pending {
            if quantity > 0 {
                *holds.entry(item_id.clone()).or_insert(0) += quantity;
            }
        }
        Ok(())
    }

    /// Releases held units, flooring each item's hold at zero.
    ///
    /// Releasing more than is held, or an item with no entry at all, is a
    /// no-op for the excess; release is safe to repeat.
    pub fn release(&self, lines: &[ReservationLine]) {
        let mut holds = self.holds.write().unwrap();
        for line in lines {
            if let Some(held) = holds.get(&line.item_id).copied() {
                let remaining = held.saturating_sub(line.quantity);
                if remaining == 0 {
                    holds.remove(&line.item_id);
                } else {
                    holds.insert(line.item_id.clone(), remaining);
                }
            }
        }
    }

    /// Returns the units currently held for an item.
    pub fn held(&self, item_id: &ItemId) -> u32 {
        self.holds
            .read()
            .unwrap()
            .get(item_id)
            .copied()
            .unwrap_or(0)
    }

    /// Returns a copy of every hold in the ledger.
    pub fn snapshot(&self) -> HashMap<ItemId, u32> {
        self.holds.read().unwrap().clone()
    }
}
