//! Catalog browsing and administration endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use catalog::{CatalogError, CatalogStore, DuplicatePolicy, ImportOptions, ImportReport, import_csv};
use common::{ItemId, Money};
use inventory::{InventoryError, ItemAvailability};
use orders::OrderStore;
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::ApiError;

// -- Request types --

#[derive(Deserialize)]
pub struct ListQuery {
    /// Only items priced strictly below this many cents.
    pub below_cents: Option<i64>,
}

#[derive(Deserialize)]
pub struct SearchQuery {
    pub q: String,
}

#[derive(Deserialize)]
pub struct SetQuantityRequest {
    pub quantity: u32,
}

#[derive(Deserialize)]
pub struct ImportQuery {
    /// `skip` (default) leaves existing items alone, `update` overwrites them.
    pub on_duplicate: Option<DuplicatePolicy>,
    pub delimiter: Option<char>,
}

// -- Response types --

#[derive(Serialize)]
pub struct ItemResponse {
    pub item_id: String,
    pub name: String,
    pub price_cents: i64,
    /// Units on hand minus active reservation holds.
    pub available: u32,
}

impl From<ItemAvailability> for ItemResponse {
    fn from(view: ItemAvailability) -> Self {
        Self {
            item_id: view.item.id.to_string(),
            name: view.item.name,
            price_cents: view.item.price.cents(),
            available: view.available,
        }
    }
}

// -- Handlers --

/// GET /catalog — every item with live availability, optionally capped by price.
#[tracing::instrument(skip(state, query))]
pub async fn list<C, O>(
    State(state): State<Arc<AppState<C, O>>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<ItemResponse>>, ApiError>
where
    C: CatalogStore + Clone + 'static,
    O: OrderStore + Clone + 'static,
{
    let views = match query.below_cents {
        Some(cents) => {
            state
                .inventory
                .list_below_price(Money::from_cents(cents))
                .await
        }
        None => state.inventory.list_available().await,
    }
    .map_err(internal)?;

    Ok(Json(views.into_iter().map(ItemResponse::from).collect()))
}

/// GET /catalog/search — items whose name contains `q`, case-insensitively.
#[tracing::instrument(skip(state, query))]
pub async fn search<C, O>(
    State(state): State<Arc<AppState<C, O>>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<ItemResponse>>, ApiError>
where
    C: CatalogStore + Clone + 'static,
    O: OrderStore + Clone + 'static,
{
    let views = state.inventory.search(&query.q).await.map_err(internal)?;
    Ok(Json(views.into_iter().map(ItemResponse::from).collect()))
}

/// GET /catalog/:item_id — one item with live availability.
#[tracing::instrument(skip(state))]
pub async fn get<C, O>(
    State(state): State<Arc<AppState<C, O>>>,
    Path(item_id): Path<String>,
) -> Result<Json<ItemResponse>, ApiError>
where
    C: CatalogStore + Clone + 'static,
    O: OrderStore + Clone + 'static,
{
    let item_id = ItemId::from(item_id.as_str());
    let view = state
        .inventory
        .item_view(&item_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| ApiError::NotFound(format!("Item {item_id} not found")))?;

    Ok(Json(view.into()))
}

/// PUT /catalog/:item_id/quantity — set an item's stock total directly.
#[tracing::instrument(skip(state, req))]
pub async fn set_quantity<C, O>(
    State(state): State<Arc<AppState<C, O>>>,
    Path(item_id): Path<String>,
    Json(req): Json<SetQuantityRequest>,
) -> Result<Json<ItemResponse>, ApiError>
where
    C: CatalogStore + Clone + 'static,
    O: OrderStore + Clone + 'static,
{
    let item_id = ItemId::from(item_id.as_str());
    let item = state
        .inventory
        .catalog()
        .set_quantity(&item_id, req.quantity)
        .await
        .map_err(|err| match err {
            CatalogError::NotFound(id) => ApiError::NotFound(format!("Item {id} not found")),
            other => ApiError::Internal(other.to_string()),
        })?;

    tracing::info!(%item_id, quantity = req.quantity, "stock total set");

    let held = state.inventory.ledger().held(&item_id);
    Ok(Json(ItemResponse {
        item_id: item.id.to_string(),
        name: item.name,
        price_cents: item.price.cents(),
        available: item.total_quantity.saturating_sub(held),
    }))
}

/// POST /catalog/import — load items from delimited text in the request body.
///
/// Row-level failures land in the report rather than failing the request.
#[tracing::instrument(skip(state, query, body))]
pub async fn import<C, O>(
    State(state): State<Arc<AppState<C, O>>>,
    Query(query): Query<ImportQuery>,
    body: String,
) -> Result<Json<ImportReport>, ApiError>
where
    C: CatalogStore + Clone + 'static,
    O: OrderStore + Clone + 'static,
{
    let options = ImportOptions {
        on_duplicate: query.on_duplicate.unwrap_or_default(),
        delimiter: query.delimiter.unwrap_or(','),
    };

    let report = import_csv(state.inventory.catalog(), &body, &options).await;
    Ok(Json(report))
}

fn internal(err: InventoryError) -> ApiError {
    ApiError::Internal(err.to_string())
}
