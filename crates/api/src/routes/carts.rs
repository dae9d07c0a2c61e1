//! Cart lifecycle and checkout endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use cart::Cart;
use catalog::CatalogStore;
use checkout::CheckoutRequest;
use common::{CartId, ItemId, Money, UserId};
use orders::OrderStore;
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::ApiError;
use crate::routes::parse_uuid;

// -- Request types --

#[derive(Deserialize)]
pub struct CreateCartRequest {
    pub user_id: Option<String>,
}

#[derive(Deserialize)]
pub struct AddItemRequest {
    pub item_id: String,
    pub quantity: u32,
}

#[derive(Deserialize)]
pub struct RemoveItemQuery {
    /// Units to remove; the whole line when omitted.
    pub quantity: Option<u32>,
}

#[derive(Deserialize)]
pub struct CheckoutRequestBody {
    pub payment_method: String,
    pub amount_cents: i64,
    pub currency: String,
}

// -- Response types --

#[derive(Serialize)]
pub struct CartResponse {
    pub cart_id: String,
    pub user_id: String,
    pub lines: Vec<CartLineResponse>,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
}

#[derive(Serialize)]
pub struct CartLineResponse {
    pub item_id: String,
    pub name: String,
    pub unit_price_cents: i64,
    pub quantity: u32,
    pub line_total_cents: i64,
}

#[derive(Serialize)]
pub struct CheckoutReceiptResponse {
    pub order_id: String,
    pub payment_id: String,
    pub total_cents: i64,
}

impl CartResponse {
    fn from_cart(cart_id: CartId, cart: &Cart) -> Self {
        let summary = cart.summary();
        Self {
            cart_id: cart_id.to_string(),
            user_id: cart.user_id().to_string(),
            lines: summary
                .lines
                .iter()
                .map(|line| CartLineResponse {
                    item_id: line.item_id.to_string(),
                    name: line.name.clone(),
                    unit_price_cents: line.unit_price.cents(),
                    quantity: line.quantity,
                    line_total_cents: line.total_price().cents(),
                })
                .collect(),
            subtotal_cents: summary.subtotal.cents(),
            tax_cents: summary.tax.cents(),
            total_cents: summary.total.cents(),
        }
    }
}

// -- Handlers --

/// POST /carts — open an empty cart, minting a user ID unless one is given.
#[tracing::instrument(skip(state, req))]
pub async fn create<C, O>(
    State(state): State<Arc<AppState<C, O>>>,
    req: Option<Json<CreateCartRequest>>,
) -> Result<(axum::http::StatusCode, Json<CartResponse>), ApiError>
where
    C: CatalogStore + Clone + 'static,
    O: OrderStore + Clone + 'static,
{
    let user_id = match req.and_then(|Json(req)| req.user_id) {
        Some(ref raw) => UserId::from_uuid(parse_uuid(raw, "user ID")?),
        None => UserId::new(),
    };

    let cart_id = CartId::new();
    let cart = Cart::new(user_id);
    let response = CartResponse::from_cart(cart_id, &cart);
    state.carts.write().await.insert(cart_id, cart);

    tracing::info!(%cart_id, %user_id, "cart created");
    Ok((axum::http::StatusCode::CREATED, Json(response)))
}

/// GET /carts/:cart_id — current lines and totals for a cart.
#[tracing::instrument(skip(state))]
pub async fn get<C, O>(
    State(state): State<Arc<AppState<C, O>>>,
    Path(cart_id): Path<String>,
) -> Result<Json<CartResponse>, ApiError>
where
    C: CatalogStore + Clone + 'static,
    O: OrderStore + Clone + 'static,
{
    let cart_id = CartId::from_uuid(parse_uuid(&cart_id, "cart ID")?);
    let carts = state.carts.read().await;
    let cart = carts
        .get(&cart_id)
        .ok_or_else(|| cart_not_found(cart_id))?;

    Ok(Json(CartResponse::from_cart(cart_id, cart)))
}

/// POST /carts/:cart_id/items — add units of an item, growing any existing line.
#[tracing::instrument(skip(state, req))]
pub async fn add_item<C, O>(
    State(state): State<Arc<AppState<C, O>>>,
    Path(cart_id): Path<String>,
    Json(req): Json<AddItemRequest>,
) -> Result<Json<CartResponse>, ApiError>
where
    C: CatalogStore + Clone + 'static,
    O: OrderStore + Clone + 'static,
{
    let cart_id = CartId::from_uuid(parse_uuid(&cart_id, "cart ID")?);
    let mut carts = state.carts.write().await;
    let cart = carts
        .get_mut(&cart_id)
        .ok_or_else(|| cart_not_found(cart_id))?;

    cart.add_item(&state.inventory, ItemId::from(req.item_id.as_str()), req.quantity)
        .await?;

    Ok(Json(CartResponse::from_cart(cart_id, cart)))
}

/// DELETE /carts/:cart_id/items/:item_id — drop units of an item, or the
/// whole line without a `quantity` parameter.
#[tracing::instrument(skip(state, query))]
pub async fn remove_item<C, O>(
    State(state): State<Arc<AppState<C, O>>>,
    Path((cart_id, item_id)): Path<(String, String)>,
    Query(query): Query<RemoveItemQuery>,
) -> Result<Json<CartResponse>, ApiError>
where
    C: CatalogStore + Clone + 'static,
    O: OrderStore + Clone + 'static,
{
    let cart_id = CartId::from_uuid(parse_uuid(&cart_id, "cart ID")?);
    let mut carts = state.carts.write().await;
    let cart = carts
        .get_mut(&cart_id)
        .ok_or_else(|| cart_not_found(cart_id))?;

    cart.remove_item(&ItemId::from(item_id.as_str()), query.quantity)?;

    Ok(Json(CartResponse::from_cart(cart_id, cart)))
}

/// POST /carts/:cart_id/checkout — run the checkout pipeline for a cart.
///
/// The cart is taken out of the open set for the duration of the run, so a
/// concurrent checkout of the same cart sees a 404 instead of a double
/// charge. A failed run puts the cart back with its lines intact; a
/// completed one drops it for good.
#[tracing::instrument(skip(state, req))]
pub async fn checkout<C, O>(
    State(state): State<Arc<AppState<C, O>>>,
    Path(cart_id): Path<String>,
    Json(req): Json<CheckoutRequestBody>,
) -> Result<Json<CheckoutReceiptResponse>, ApiError>
where
    C: CatalogStore + Clone + 'static,
    O: OrderStore + Clone + 'static,
{
    let cart_id = CartId::from_uuid(parse_uuid(&cart_id, "cart ID")?);
    let mut cart = state
        .carts
        .write()
        .await
        .remove(&cart_id)
        .ok_or_else(|| cart_not_found(cart_id))?;

    let request = CheckoutRequest {
        payment_method: req.payment_method,
        amount: Money::from_cents(req.amount_cents),
        currency: req.currency,
    };

    match state.orchestrator.checkout(&mut cart, request).await {
        Ok(receipt) => Ok(Json(CheckoutReceiptResponse {
            order_id: receipt.order_id.to_string(),
            payment_id: receipt.payment_id.to_string(),
            total_cents: receipt.total.cents(),
        })),
        Err(err) => {
            state.carts.write().await.insert(cart_id, cart);
            Err(err.into())
        }
    }
}

fn cart_not_found(cart_id: CartId) -> ApiError {
    ApiError::NotFound(format!("Cart {cart_id} not found"))
}
