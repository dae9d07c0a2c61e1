//! Order model.

use chrono::{DateTime, Utc};
use common::{ItemId, Money, OrderId, PaymentId, UserId};
use serde::{Deserialize, Serialize};

/// One priced line of a placed order.
///
/// Name and unit price are frozen at checkout time; later catalog edits do
/// not reach back into placed orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    /// The purchased item.
    pub item_id: ItemId,

    /// Item name at the time of purchase.
    pub name: String,

    /// Price per unit at the time of purchase.
    pub unit_price: Money,

    /// Units purchased.
    pub quantity: u32,

    /// Line total (quantity * unit_price).
    pub subtotal: Money,
}

impl OrderLine {
    /// Creates an order line, computing the line subtotal.
    pub fn new(item_id: ItemId, name: impl Into<String>, unit_price: Money, quantity: u32) -> Self {
        Self {
            item_id,
            name: name.into(),
            unit_price,
            quantity,
            subtotal: unit_price.multiply(quantity),
        }
    }
}

/// An immutable record of a completed checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Unique order identifier.
    pub order_id: OrderId,

    /// The customer who placed the order.
    pub user_id: UserId,

    /// Reference to the successful charge.
    pub payment_id: PaymentId,

    /// The purchased lines.
    pub lines: Vec<OrderLine>,

    /// Sum of line subtotals.
    pub subtotal: Money,

    /// Tax charged on the subtotal.
    pub tax: Money,

    /// Amount charged (subtotal + tax).
    pub total: Money,

    /// When the order was placed.
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Creates a new order with a fresh ID, stamped with the current time.
    pub fn new(
        user_id: UserId,
        payment_id: PaymentId,
        lines: Vec<OrderLine>,
        subtotal: Money,
        tax: Money,
        total: Money,
    ) -> Self {
        Self {
            order_id: OrderId::new(),
            user_id,
            payment_id,
            lines,
            subtotal,
            tax,
            total,
            created_at: Utc::now(),
        }
    }
}
