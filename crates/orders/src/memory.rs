//! In-memory order store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::{OrderId, PaymentId, UserId};
use tokio::sync::RwLock;

use crate::{Order, OrderStore, OrderStoreError, Result};

#[derive(Debug, Default)]
struct InMemoryOrderState {
    orders: HashMap<OrderId, Order>,
    fail_on_create: bool,
}

/// In-memory order store for tests and the default server wiring.
///
/// Provides the same interface as the PostgreSQL implementation, plus a
/// failure-injection switch so callers can exercise persistence-outage paths.
#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    state: Arc<RwLock<InMemoryOrderState>>,
}

impl InMemoryOrderStore {
    /// Creates a new empty in-memory order store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures every create to fail, simulating a store outage.
    pub async fn set_fail_on_create(&self, fail: bool) {
        self.state.write().await.fail_on_create = fail;
    }

    /// Returns the number of orders stored.
    pub async fn order_count(&self) -> usize {
        self.state.read().await.orders.len()
    }

    /// Clears all orders.
    pub async fn clear(&self) {
        self.state.write().await.orders.clear();
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn create(&self, order: Order) -> Result<()> {
        let mut state = self.state.write().await;
        if state.fail_on_create {
            return Err(OrderStoreError::Unavailable(
                "injected create failure".into(),
            ));
        }
        if state.orders.contains_key(&order.order_id) {
            return Err(OrderStoreError::Duplicate(order.order_id));
        }
        if state
            .orders
            .values()
            .any(|existing| existing.payment_id == order.payment_id)
        {
            return Err(OrderStoreError::DuplicatePayment(order.payment_id));
        }
        state.orders.insert(order.order_id, order);
        Ok(())
    }

    async fn find_by_order_id(&self, order_id: OrderId) -> Result<Option<Order>> {
        Ok(self.state.read().await.orders.get(&order_id).cloned())
    }

    async fn find_by_payment_id(&self, payment_id: &PaymentId) -> Result<Option<Order>> {
        Ok(self
            .state
            .read()
            .await
            .orders
            .values()
            .find(|order| &order.payment_id == payment_id)
            .cloned())
    }

    async fn find_by_user(&self, user_id: UserId) -> Result<Vec<Order>> {
        let state = self.state.read().await;
        let mut orders: Vec<_> = state
            .orders
            .values()
            .filter(|order| order.user_id == user_id)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }
}
