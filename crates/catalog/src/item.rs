//! Catalog item model.

use chrono::{DateTime, Utc};
use common::{ItemId, Money};
use serde::{Deserialize, Serialize};

/// An item in the catalog with its authoritative stock total.
///
/// `total_quantity` is the durable stock count. It does not account for
/// in-flight reservations; subtracting those is the inventory service's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// The item identifier (SKU).
    pub id: ItemId,

    /// Human-readable item name.
    pub name: String,

    /// Price per unit in cents.
    pub price: Money,

    /// Units in stock before subtracting reservation holds.
    pub total_quantity: u32,

    /// When the item was first added to the catalog.
    pub created_at: DateTime<Utc>,

    /// When the item was last modified.
    pub updated_at: DateTime<Utc>,
}

impl CatalogItem {
    /// Creates a new catalog item stamped with the current time.
    pub fn new(
        id: impl Into<ItemId>,
        name: impl Into<String>,
        price: Money,
        total_quantity: u32,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.into(),
            price,
            total_quantity,
            created_at: now,
            updated_at: now,
        }
    }
}
