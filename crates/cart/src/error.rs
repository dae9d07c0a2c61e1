use common::ItemId;
use inventory::InventoryError;
use thiserror::Error;

/// Errors that can occur during cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// Quantities must be at least one.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(u32),

    /// The catalog has no item with this ID.
    #[error("Item unavailable: {0}")]
    ItemUnavailable(ItemId),

    /// The requested line quantity exceeds what can still be sold.
    #[error("Insufficient inventory for {item_id}: requested {requested}, available {available}")]
    InsufficientInventory {
        item_id: ItemId,
        requested: u32,
        available: u32,
    },

    /// The cart has no line for this item.
    #[error("Item not in cart: {0}")]
    ItemNotInCart(ItemId),

    /// Inventory lookup failed.
    #[error("Inventory error: {0}")]
    Inventory(#[from] InventoryError),
}

/// Result type for cart operations.
pub type Result<T> = std::result::Result<T, CartError>;
