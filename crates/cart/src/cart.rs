//! Cart lines and pricing.

use std::collections::HashMap;

use catalog::CatalogStore;
use common::{ItemId, Money, UserId};
use inventory::{InventoryService, ReservationLine};
use serde::{Deserialize, Serialize};

use crate::{CartError, Result};

/// Tax rate applied to the cart subtotal, in basis points (800 = 8%).
pub const TAX_RATE_BASIS_POINTS: i64 = 800;

/// Tax on a non-negative subtotal, rounded half away from zero at the cent.
fn tax_on(subtotal: Money) -> Money {
    Money::from_cents((subtotal.cents() * TAX_RATE_BASIS_POINTS + 5_000) / 10_000)
}

/// One line of a cart: an item, its priced snapshot, and a quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// The item identifier.
    pub item_id: ItemId,

    /// Item name as of the last refresh.
    pub name: String,

    /// Price per unit as of the last refresh.
    pub unit_price: Money,

    /// Units in the cart.
    pub quantity: u32,
}

impl CartLine {
    /// Returns the total price for this line (quantity * unit_price).
    pub fn total_price(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}

/// Priced view of a cart: its lines plus subtotal, tax, and total.
///
/// Lines are sorted by item ID for deterministic output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartSummary {
    pub lines: Vec<CartLine>,
    pub subtotal: Money,
    pub tax: Money,
    pub total: Money,
}

/// A customer's open cart.
///
/// Lines are keyed by item ID, so adding the same item twice grows one
/// line. Names and unit prices are snapshots of the catalog taken when the
/// line was last touched; [`Cart::refresh_lines`] brings them current
/// before checkout prices anything.
#[derive(Debug, Clone)]
pub struct Cart {
    user_id: UserId,
    lines: HashMap<ItemId, CartLine>,
}

impl Cart {
    /// Creates an empty cart owned by the given user.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            lines: HashMap::new(),
        }
    }

    /// Returns the owning user.
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns true if the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Returns the number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Returns the quantity carried for an item, zero if absent.
    pub fn quantity_of(&self, item_id: &ItemId) -> u32 {
        self.lines.get(item_id).map(|l| l.quantity).unwrap_or(0)
    }

    /// Adds units of an item, growing an existing line if present.
    ///
    /// The item must exist in the catalog and the line's new cumulative
    /// quantity must fit within current availability (holds subtracted).
    /// The line's name and price are refreshed from the catalog on the way.
    pub async fn add_item<C: CatalogStore>(
        &mut self,
        inventory: &InventoryService<C>,
        item_id: ItemId,
        quantity: u32,
    ) -> Result<()> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity(quantity));
        }

        let view = inventory
            .item_view(&item_id)
            .await?
            .ok_or_else(|| CartError::ItemUnavailable(item_id.clone()))?;

        let current = self.quantity_of(&item_id);
        if u64::from(current) + u64::from(quantity) > u64::from(view.available) {
            return Err(CartError::InsufficientInventory {
                item_id,
                requested: current.saturating_add(quantity),
                available: view.available,
            });
        }

        self.lines.insert(
            item_id.clone(),
            CartLine {
                item_id,
                name: view.item.name,
                unit_price: view.item.price,
                quantity: current + quantity,
            },
        );
        Ok(())
    }

    /// Removes units of an item.
    ///
    /// With `quantity` omitted, or at least the line's quantity, the whole
    /// line goes away; otherwise the line shrinks by that many units.
    pub fn remove_item(&mut self, item_id: &ItemId, quantity: Option<u32>) -> Result<()> {
        let line = self
            .lines
            .get_mut(item_id)
            .ok_or_else(|| CartError::ItemNotInCart(item_id.clone()))?;

        match quantity {
            None => {
                self.lines.remove(item_id);
            }
            Some(q) if q >= line.quantity => {
                self.lines.remove(item_id);
            }
            Some(q) => {
                line.quantity -= q;
            }
        }
        Ok(())
    }

    /// Prices the cart as it stands: line totals, subtotal, 8% tax, total.
    ///
    /// Pure arithmetic over the stored snapshots; nothing is re-read from
    /// the catalog.
    pub fn summary(&self) -> CartSummary {
        let mut lines: Vec<CartLine> = self.lines.values().cloned().collect();
        lines.sort_by(|a, b| a.item_id.cmp(&b.item_id));

        let subtotal: Money = lines.iter().map(CartLine::total_price).sum();
        let tax = tax_on(subtotal);
        let total = subtotal + tax;

        CartSummary {
            lines,
            subtotal,
            tax,
            total,
        }
    }

    /// Re-reads every line from the inventory view, updating names and
    /// prices in place.
    ///
    /// Fails without touching the cart if any item has disappeared
    /// ([`CartError::ItemUnavailable`]) or no longer covers its line
    /// quantity ([`CartError::InsufficientInventory`]).
    pub async fn refresh_lines<C: CatalogStore>(
        &mut self,
        inventory: &InventoryService<C>,
    ) -> Result<()> {
        let mut refreshed = Vec::with_capacity(self.lines.len());
        for line in self.lines.values() {
            let view = inventory
                .item_view(&line.item_id)
                .await?
                .ok_or_else(|| CartError::ItemUnavailable(line.item_id.clone()))?;

            if view.available < line.quantity {
                return Err(CartError::InsufficientInventory {
                    item_id: line.item_id.clone(),
                    requested: line.quantity,
                    available: view.available,
                });
            }
            refreshed.push((line.item_id.clone(), view.item.name, view.item.price));
        }

        for (item_id, name, price) in refreshed {
            if let Some(line) = self.lines.get_mut(&item_id) {
                line.name = name;
                line.unit_price = price;
            }
        }
        Ok(())
    }

    /// Builds the reservation request for this cart, sorted by item ID so
    /// reserve and commit walk the lines in the same order.
    pub fn reservation_lines(&self) -> Vec<ReservationLine> {
        let mut lines: Vec<ReservationLine> = self
            .lines
            .values()
            .map(|line| ReservationLine::new(line.item_id.clone(), line.quantity))
            .collect();
        lines.sort_by(|a, b| a.item_id.cmp(&b.item_id));
        lines
    }

    /// Empties the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
    }
}
