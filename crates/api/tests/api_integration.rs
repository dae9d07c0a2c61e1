//! Integration tests for the API server.

use std::sync::{Arc, OnceLock};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use catalog::{CatalogItem, CatalogStore, InMemoryCatalogStore};
use common::Money;
use metrics_exporter_prometheus::PrometheusHandle;
use orders::InMemoryOrderStore;
use serde_json::{Value, json};
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

type TestState = Arc<api::AppState<InMemoryCatalogStore, InMemoryOrderStore>>;

async fn setup() -> (Router, TestState) {
    let state = api::create_default_state();
    seed_catalog(state.inventory.catalog()).await;
    let app = api::create_app(state.clone(), get_metrics_handle());
    (app, state)
}

async fn seed_catalog(catalog: &InMemoryCatalogStore) {
    for item in [
        CatalogItem::new("SKU-001", "Mechanical Keyboard", Money::from_cents(8999), 10),
        CatalogItem::new("SKU-002", "USB Cable", Money::from_cents(1299), 50),
        CatalogItem::new("SKU-003", "Monitor Stand", Money::from_cents(4500), 2),
    ] {
        catalog.insert(item).await.unwrap();
    }
}

// -- Request plumbing --

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn put_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Sends a request and decodes the JSON body, `Null` when the body is empty.
async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

async fn send_raw(app: &Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

async fn open_cart(app: &Router, user_id: Option<&str>) -> String {
    let body = match user_id {
        Some(id) => json!({ "user_id": id }),
        None => json!({}),
    };
    let (status, cart) = send(app, post_json("/carts", &body)).await;
    assert_eq!(status, StatusCode::CREATED);
    cart["cart_id"].as_str().unwrap().to_string()
}

async fn add_item(app: &Router, cart_id: &str, item_id: &str, quantity: u32) -> (StatusCode, Value) {
    send(
        app,
        post_json(
            &format!("/carts/{cart_id}/items"),
            &json!({ "item_id": item_id, "quantity": quantity }),
        ),
    )
    .await
}

async fn checkout(app: &Router, cart_id: &str, amount_cents: i64) -> (StatusCode, Value) {
    send(
        app,
        post_json(
            &format!("/carts/{cart_id}/checkout"),
            &json!({
                "payment_method": "card",
                "amount_cents": amount_cents,
                "currency": "USD"
            }),
        ),
    )
    .await
}

async fn available(app: &Router, item_id: &str) -> u64 {
    let (status, item) = send(app, get(&format!("/catalog/{item_id}"))).await;
    assert_eq!(status, StatusCode::OK);
    item["available"].as_u64().unwrap()
}

// -- Health and metrics --

#[tokio::test]
async fn health_check() {
    let (app, _) = setup().await;

    let (status, json) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert!(json["version"].as_str().is_some());
}

#[tokio::test]
async fn metrics_render_checkout_counters() {
    let (app, _) = setup().await;

    let cart_id = open_cart(&app, None).await;
    add_item(&app, &cart_id, "SKU-002", 1).await;
    // 1299 + 8% tax = 1403
    let (status, _) = checkout(&app, &cart_id, 1403).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send_raw(&app, get("/metrics")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("checkout_executions_total"));
}

#[tokio::test]
async fn unknown_route_is_404() {
    let (app, _) = setup().await;

    let (status, _) = send(&app, get("/nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// -- Carts --

#[tokio::test]
async fn create_cart_echoes_user_and_starts_empty() {
    let (app, _) = setup().await;
    let user_id = uuid::Uuid::new_v4().to_string();

    let (status, cart) = send(&app, post_json("/carts", &json!({ "user_id": user_id }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(cart["user_id"], user_id.as_str());
    assert!(cart["cart_id"].as_str().is_some());
    assert_eq!(cart["lines"].as_array().unwrap().len(), 0);
    assert_eq!(cart["total_cents"], 0);
}

#[tokio::test]
async fn create_cart_rejects_malformed_user_id() {
    let (app, _) = setup().await;

    let (status, body) = send(&app, post_json("/carts", &json!({ "user_id": "nope" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Invalid user ID"));
}

#[tokio::test]
async fn add_item_grows_one_line_and_prices_it() {
    let (app, _) = setup().await;
    let cart_id = open_cart(&app, None).await;

    let (status, _) = add_item(&app, &cart_id, "SKU-001", 2).await;
    assert_eq!(status, StatusCode::OK);

    let (status, cart) = add_item(&app, &cart_id, "SKU-001", 1).await;
    assert_eq!(status, StatusCode::OK);

    let lines = cart["lines"].as_array().unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["quantity"], 3);
    assert_eq!(lines[0]["unit_price_cents"], 8999);
    assert_eq!(lines[0]["line_total_cents"], 26997);
    assert_eq!(cart["subtotal_cents"], 26997);
    assert_eq!(cart["tax_cents"], 2160);
    assert_eq!(cart["total_cents"], 29157);
}

#[tokio::test]
async fn add_unknown_item_is_404() {
    let (app, _) = setup().await;
    let cart_id = open_cart(&app, None).await;

    let (status, _) = add_item(&app, &cart_id, "SKU-404", 1).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn add_item_beyond_availability_is_409() {
    let (app, _) = setup().await;
    let cart_id = open_cart(&app, None).await;

    let (status, body) = add_item(&app, &cart_id, "SKU-003", 3).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("available 2"));
}

#[tokio::test]
async fn add_item_with_zero_quantity_is_400() {
    let (app, _) = setup().await;
    let cart_id = open_cart(&app, None).await;

    let (status, _) = add_item(&app, &cart_id, "SKU-001", 0).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_cart_is_404_and_bad_id_is_400() {
    let (app, _) = setup().await;

    let (status, _) = send(&app, get(&format!("/carts/{}", uuid::Uuid::new_v4()))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, get("/carts/not-a-uuid")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn remove_item_shrinks_then_deletes_the_line() {
    let (app, _) = setup().await;
    let cart_id = open_cart(&app, None).await;
    add_item(&app, &cart_id, "SKU-002", 3).await;

    let (status, cart) = send(
        &app,
        delete(&format!("/carts/{cart_id}/items/SKU-002?quantity=1")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["lines"][0]["quantity"], 2);

    let (status, cart) = send(&app, delete(&format!("/carts/{cart_id}/items/SKU-002"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["lines"].as_array().unwrap().len(), 0);

    let (status, _) = send(&app, delete(&format!("/carts/{cart_id}/items/SKU-002"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// -- Checkout --

#[tokio::test]
async fn checkout_places_order_and_commits_stock() {
    let (app, _) = setup().await;
    let user_id = uuid::Uuid::new_v4().to_string();
    let cart_id = open_cart(&app, Some(&user_id)).await;
    add_item(&app, &cart_id, "SKU-001", 2).await;

    // 17998 + 8% tax (1440) = 19438
    let (status, receipt) = checkout(&app, &cart_id, 19438).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(receipt["total_cents"], 19438);
    assert_eq!(receipt["payment_id"], "PAY-0001");
    let order_id = receipt["order_id"].as_str().unwrap().to_string();

    // The cart is gone and the stock decrement is durable.
    let (status, _) = send(&app, get(&format!("/carts/{cart_id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(available(&app, "SKU-001").await, 8);

    // The order is visible through every lookup.
    let (status, order) = send(&app, get(&format!("/orders/{order_id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["user_id"], user_id.as_str());
    assert_eq!(order["payment_id"], "PAY-0001");
    assert_eq!(order["total_cents"], 19438);
    assert_eq!(order["lines"].as_array().unwrap().len(), 1);
    assert!(order["created_at"].as_str().is_some());

    let (status, orders) = send(&app, get(&format!("/orders/user/{user_id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(orders.as_array().unwrap().len(), 1);

    let (status, by_payment) = send(&app, get("/orders/payment/PAY-0001")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(by_payment["order_id"], order_id.as_str());
}

#[tokio::test]
async fn checkout_with_wrong_amount_is_400_and_keeps_the_cart() {
    let (app, _) = setup().await;
    let cart_id = open_cart(&app, None).await;
    add_item(&app, &cart_id, "SKU-001", 2).await;

    let (status, body) = checkout(&app, &cart_id, 100).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("mismatch"));

    // Cart intact, holds released.
    let (status, cart) = send(&app, get(&format!("/carts/{cart_id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["lines"].as_array().unwrap().len(), 1);
    assert_eq!(available(&app, "SKU-001").await, 10);
}

#[tokio::test]
async fn checkout_of_empty_cart_is_400() {
    let (app, _) = setup().await;
    let cart_id = open_cart(&app, None).await;

    let (status, _) = checkout(&app, &cart_id, 0).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn declined_payment_is_402_and_restores_availability() {
    let (app, state) = setup().await;
    let cart_id = open_cart(&app, None).await;
    add_item(&app, &cart_id, "SKU-003", 2).await;

    state.orchestrator.gateway().set_decline("card declined");

    // 9000 + 8% tax (720) = 9720
    let (status, body) = checkout(&app, &cart_id, 9720).await;
    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
    assert!(body["error"].as_str().unwrap().contains("card declined"));

    let (status, _) = send(&app, get(&format!("/carts/{cart_id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(available(&app, "SKU-003").await, 2);
}

#[tokio::test]
async fn checkout_of_missing_cart_is_404() {
    let (app, _) = setup().await;

    let (status, _) = checkout(&app, &uuid::Uuid::new_v4().to_string(), 1000).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// -- Catalog --

#[tokio::test]
async fn catalog_list_search_and_price_filter() {
    let (app, _) = setup().await;

    let (status, items) = send(&app, get("/catalog")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(items.as_array().unwrap().len(), 3);
    assert_eq!(items[0]["item_id"], "SKU-001");
    assert_eq!(items[0]["available"], 10);

    let (status, found) = send(&app, get("/catalog/search?q=usb")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found.as_array().unwrap().len(), 1);
    assert_eq!(found[0]["item_id"], "SKU-002");

    // Strictly below: SKU-003 at exactly 4500 is excluded.
    let (status, cheap) = send(&app, get("/catalog?below_cents=4500")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cheap.as_array().unwrap().len(), 1);
    assert_eq!(cheap[0]["item_id"], "SKU-002");
}

#[tokio::test]
async fn get_unknown_catalog_item_is_404() {
    let (app, _) = setup().await;

    let (status, _) = send(&app, get("/catalog/SKU-404")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn set_quantity_changes_availability() {
    let (app, _) = setup().await;

    let (status, item) = send(
        &app,
        put_json("/catalog/SKU-003/quantity", &json!({ "quantity": 7 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(item["available"], 7);
    assert_eq!(available(&app, "SKU-003").await, 7);

    let (status, _) = send(
        &app,
        put_json("/catalog/SKU-404/quantity", &json!({ "quantity": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn import_loads_rows_and_reports_failures() {
    let (app, _) = setup().await;

    let csv = "id,name,price,quantity\n\
               SKU-100,Webcam,49.99,5\n\
               SKU-101,Desk Mat,19.50,12\n\
               SKU-102,Broken Row,oops,1\n";
    let request = Request::builder()
        .method("POST")
        .uri("/catalog/import")
        .header("content-type", "text/csv")
        .body(Body::from(csv))
        .unwrap();

    let (status, report) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["processed"], 3);
    assert_eq!(report["succeeded"], 2);
    assert_eq!(report["failed"], 1);
    assert_eq!(report["errors"][0]["row"], 4);

    let (status, item) = send(&app, get("/catalog/SKU-100")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(item["price_cents"], 4999);
    assert_eq!(item["available"], 5);
}

// -- Orders --

#[tokio::test]
async fn order_lookups_reject_bad_input() {
    let (app, _) = setup().await;

    let (status, _) = send(&app, get("/orders/not-a-uuid")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, get(&format!("/orders/{}", uuid::Uuid::new_v4()))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, get("/orders/payment/PAY-9999")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, orders) = send(&app, get(&format!("/orders/user/{}", uuid::Uuid::new_v4()))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(orders.as_array().unwrap().len(), 0);
}
