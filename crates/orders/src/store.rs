//! Order store trait.

use async_trait::async_trait;
use common::{OrderId, PaymentId, UserId};

use crate::{Order, Result};

/// Storage seam for placed orders.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persists a new order.
    ///
    /// Fails with [`OrderStoreError::Duplicate`] if the order ID is taken,
    /// or [`OrderStoreError::DuplicatePayment`] if another order already
    /// references the same payment.
    ///
    /// [`OrderStoreError::Duplicate`]: crate::OrderStoreError::Duplicate
    /// [`OrderStoreError::DuplicatePayment`]: crate::OrderStoreError::DuplicatePayment
    async fn create(&self, order: Order) -> Result<()>;

    /// Fetches an order by its ID, or `None` if unknown.
    async fn find_by_order_id(&self, order_id: OrderId) -> Result<Option<Order>>;

    /// Fetches the order that recorded a payment, or `None` if no order
    /// references it.
    async fn find_by_payment_id(&self, payment_id: &PaymentId) -> Result<Option<Order>>;

    /// Returns a user's orders, newest first.
    async fn find_by_user(&self, user_id: UserId) -> Result<Vec<Order>>;
}
