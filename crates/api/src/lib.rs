//! HTTP API server for the storefront order pipeline.
//!
//! Provides REST endpoints for cart management, catalog browsing and
//! administration, checkout, and order lookup, with structured logging
//! (tracing) and Prometheus metrics. The cart routes and the checkout
//! orchestrator share one [`InventoryService`] so availability answers and
//! reservation holds always agree.

pub mod config;
pub mod error;
pub mod routes;

use std::collections::HashMap;
use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, post, put};
use cart::Cart;
use catalog::{CatalogStore, InMemoryCatalogStore};
use checkout::{CheckoutOrchestrator, InMemoryPaymentGateway};
use common::CartId;
use inventory::InventoryService;
use metrics_exporter_prometheus::PrometheusHandle;
use orders::{InMemoryOrderStore, OrderStore};
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared state behind every route.
pub struct AppState<C: CatalogStore, O: OrderStore> {
    /// Availability view and reservation ledger over the catalog.
    pub inventory: InventoryService<C>,
    /// Checkout pipeline wired to the same ledger as `inventory`.
    pub orchestrator: CheckoutOrchestrator<C, InMemoryPaymentGateway, O>,
    /// Order lookup store.
    pub orders: O,
    /// Open carts by ID. Carts live in process memory and vanish on
    /// restart; a successful checkout removes its cart.
    pub carts: RwLock<HashMap<CartId, Cart>>,
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<C, O>(state: Arc<AppState<C, O>>, metrics_handle: PrometheusHandle) -> Router
where
    C: CatalogStore + Clone + 'static,
    O: OrderStore + Clone + 'static,
{
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/carts", post(routes::carts::create::<C, O>))
        .route("/carts/{cart_id}", get(routes::carts::get::<C, O>))
        .route("/carts/{cart_id}/items", post(routes::carts::add_item::<C, O>))
        .route(
            "/carts/{cart_id}/items/{item_id}",
            delete(routes::carts::remove_item::<C, O>),
        )
        .route("/carts/{cart_id}/checkout", post(routes::carts::checkout::<C, O>))
        .route("/catalog", get(routes::catalog::list::<C, O>))
        .route("/catalog/search", get(routes::catalog::search::<C, O>))
        .route("/catalog/import", post(routes::catalog::import::<C, O>))
        .route("/catalog/{item_id}", get(routes::catalog::get::<C, O>))
        .route(
            "/catalog/{item_id}/quantity",
            put(routes::catalog::set_quantity::<C, O>),
        )
        .route("/orders/user/{user_id}", get(routes::orders::list_for_user::<C, O>))
        .route(
            "/orders/payment/{payment_id}",
            get(routes::orders::get_by_payment::<C, O>),
        )
        .route("/orders/{order_id}", get(routes::orders::get::<C, O>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates application state over the given catalog and order stores.
pub fn create_state<C, O>(catalog: C, orders: O) -> Arc<AppState<C, O>>
where
    C: CatalogStore + Clone + 'static,
    O: OrderStore + Clone + 'static,
{
    let inventory = InventoryService::new(catalog);
    let orchestrator = CheckoutOrchestrator::new(
        inventory.clone(),
        InMemoryPaymentGateway::new(),
        orders.clone(),
    );

    Arc::new(AppState {
        inventory,
        orchestrator,
        orders,
        carts: RwLock::new(HashMap::new()),
    })
}

/// Creates state backed by in-memory stores, for local runs and tests.
pub fn create_default_state() -> Arc<AppState<InMemoryCatalogStore, InMemoryOrderStore>> {
    create_state(InMemoryCatalogStore::new(), InMemoryOrderStore::new())
}
