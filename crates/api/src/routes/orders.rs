//! Order lookup endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use catalog::CatalogStore;
use common::{OrderId, PaymentId, UserId};
use orders::{Order, OrderStore};
use serde::Serialize;

use crate::AppState;
use crate::error::ApiError;
use crate::routes::parse_uuid;

// -- Response types --

#[derive(Serialize)]
pub struct OrderResponse {
    pub order_id: String,
    pub user_id: String,
    pub payment_id: String,
    pub lines: Vec<OrderLineResponse>,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
    pub created_at: String,
}

#[derive(Serialize)]
pub struct OrderLineResponse {
    pub item_id: String,
    pub name: String,
    pub unit_price_cents: i64,
    pub quantity: u32,
    pub subtotal_cents: i64,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            order_id: order.order_id.to_string(),
            user_id: order.user_id.to_string(),
            payment_id: order.payment_id.to_string(),
            lines: order
                .lines
                .into_iter()
                .map(|line| OrderLineResponse {
                    item_id: line.item_id.to_string(),
                    name: line.name,
                    unit_price_cents: line.unit_price.cents(),
                    quantity: line.quantity,
                    subtotal_cents: line.subtotal.cents(),
                })
                .collect(),
            subtotal_cents: order.subtotal.cents(),
            tax_cents: order.tax.cents(),
            total_cents: order.total.cents(),
            created_at: order.created_at.to_rfc3339(),
        }
    }
}

// -- Handlers --

/// GET /orders/:order_id — load a placed order by ID.
#[tracing::instrument(skip(state))]
pub async fn get<C, O>(
    State(state): State<Arc<AppState<C, O>>>,
    Path(order_id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError>
where
    C: CatalogStore + Clone + 'static,
    O: OrderStore + Clone + 'static,
{
    let id = OrderId::from_uuid(parse_uuid(&order_id, "order ID")?);
    let order = state
        .orders
        .find_by_order_id(id)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .ok_or_else(|| ApiError::NotFound(format!("Order {order_id} not found")))?;

    Ok(Json(order.into()))
}

/// GET /orders/user/:user_id — all orders placed by a user, newest first.
#[tracing::instrument(skip(state))]
pub async fn list_for_user<C, O>(
    State(state): State<Arc<AppState<C, O>>>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<OrderResponse>>, ApiError>
where
    C: CatalogStore + Clone + 'static,
    O: OrderStore + Clone + 'static,
{
    let id = UserId::from_uuid(parse_uuid(&user_id, "user ID")?);
    let orders = state
        .orders
        .find_by_user(id)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(orders.into_iter().map(OrderResponse::from).collect()))
}

/// GET /orders/payment/:payment_id — the order recorded for a payment.
#[tracing::instrument(skip(state))]
pub async fn get_by_payment<C, O>(
    State(state): State<Arc<AppState<C, O>>>,
    Path(payment_id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError>
where
    C: CatalogStore + Clone + 'static,
    O: OrderStore + Clone + 'static,
{
    let id = PaymentId::from(payment_id.as_str());
    let order = state
        .orders
        .find_by_payment_id(&id)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .ok_or_else(|| ApiError::NotFound(format!("No order for payment {payment_id}")))?;

    Ok(Json(order.into()))
}
