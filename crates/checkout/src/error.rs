//! Checkout error types.

use common::{ItemId, Money, OrderId};
use inventory::InventoryError;
use thiserror::Error;

/// Errors that can occur during checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The cart has no lines.
    #[error("Cart is empty")]
    EmptyCart,

    /// An item in the cart no longer exists in the catalog.
    #[error("Item not available: {0}")]
    ItemUnavailable(ItemId),

    /// An item's availability no longer covers its cart quantity.
    #[error("Insufficient inventory for {item_id}: requested {requested}, available {available}")]
    InsufficientInventory {
        item_id: ItemId,
        requested: u32,
        available: u32,
    },

    /// The reservation ledger refused the request, usually because a
    /// concurrent checkout took the stock first.
    #[error("Reservation failed for {item_id}: requested {requested}, available {available}")]
    ReservationFailed {
        item_id: ItemId,
        requested: u32,
        available: u32,
    },

    /// The payment amount does not match the cart total within tolerance.
    #[error("Payment amount mismatch: cart total is {expected}, payment amount is {provided}")]
    AmountMismatch { expected: Money, provided: Money },

    /// The payment was declined or the gateway could not be reached.
    #[error("Payment failed: {0}")]
    PaymentFailed(String),

    /// A backing store failed.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// The order is placed and paid, but some stock decrements did not
    /// happen. The uncommitted reservation holds are left in the ledger.
    #[error("Order {order_id} placed but stock commit incomplete")]
    CommitIncomplete {
        order_id: OrderId,
        #[source]
        source: InventoryError,
    },

    /// An error outside the expected failure modes of the pipeline.
    #[error("Unexpected checkout error: {0}")]
    Unexpected(String),
}

/// Result type for checkout operations.
pub type Result<T> = std::result::Result<T, CheckoutError>;
