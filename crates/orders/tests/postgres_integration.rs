//! PostgreSQL integration tests for the order store.
//!
//! These tests share one PostgreSQL container and need a running Docker
//! daemon, so they are ignored by default. Run with:
//!
//! ```bash
//! cargo test -p orders --test postgres_integration -- --ignored
//! ```

use std::sync::Arc;

use chrono::{Duration, Utc};
use common::{ItemId, Money, OrderId, PaymentId, UserId};
use orders::{Order, OrderLine, OrderStore, OrderStoreError, PostgresOrderStore};
use serial_test::serial;
use sqlx::PgPool;
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            let temp_pool = PgPool::connect(&connection_string).await.unwrap();
            sqlx::raw_sql(include_str!(
                "../../../migrations/002_create_orders_table.sql"
            ))
            .execute(&temp_pool)
            .await
            .unwrap();
            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Get a fresh store with its own pool and a cleared table
async fn get_test_store() -> PostgresOrderStore {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    sqlx::query("TRUNCATE TABLE orders")
        .execute(&pool)
        .await
        .unwrap();

    PostgresOrderStore::new(pool)
}

fn order_for(user_id: UserId, payment: &str) -> Order {
    Order::new(
        user_id,
        PaymentId::new(payment),
        vec![
            OrderLine::new(ItemId::new("SKU-001"), "Widget", Money::from_cents(1000), 2),
            OrderLine::new(ItemId::new("SKU-002"), "Gadget", Money::from_cents(500), 1),
        ],
        Money::from_cents(2500),
        Money::from_cents(200),
        Money::from_cents(2700),
    )
}

#[tokio::test]
#[serial]
#[ignore = "requires a Docker daemon"]
async fn create_and_find_roundtrip() {
    let store = get_test_store().await;
    let order = order_for(UserId::new(), "PAY-0001");
    let order_id = order.order_id;
    store.create(order.clone()).await.unwrap();

    let found = store.find_by_order_id(order_id).await.unwrap().unwrap();
    assert_eq!(found.order_id, order.order_id);
    assert_eq!(found.user_id, order.user_id);
    assert_eq!(found.payment_id, order.payment_id);
    assert_eq!(found.lines, order.lines);
    assert_eq!(found.total, Money::from_cents(2700));

    assert!(store.find_by_order_id(OrderId::new()).await.unwrap().is_none());
}

#[tokio::test]
#[serial]
#[ignore = "requires a Docker daemon"]
async fn duplicate_order_id_maps_constraint_violation() {
    let store = get_test_store().await;
    let order = order_for(UserId::new(), "PAY-0001");
    store.create(order.clone()).await.unwrap();

    let mut copy = order_for(UserId::new(), "PAY-0002");
    copy.order_id = order.order_id;
    let result = store.create(copy).await;
    assert!(matches!(result, Err(OrderStoreError::Duplicate(_))));
}

#[tokio::test]
#[serial]
#[ignore = "requires a Docker daemon"]
async fn duplicate_payment_id_maps_constraint_violation() {
    let store = get_test_store().await;
    store
        .create(order_for(UserId::new(), "PAY-0001"))
        .await
        .unwrap();

    let result = store.create(order_for(UserId::new(), "PAY-0001")).await;
    assert!(matches!(result, Err(OrderStoreError::DuplicatePayment(_))));
}

#[tokio::test]
#[serial]
#[ignore = "requires a Docker daemon"]
async fn find_by_payment_id() {
    let store = get_test_store().await;
    let order = order_for(UserId::new(), "PAY-0001");
    store.create(order.clone()).await.unwrap();

    let found = store
        .find_by_payment_id(&PaymentId::new("PAY-0001"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.order_id, order.order_id);

    assert!(
        store
            .find_by_payment_id(&PaymentId::new("PAY-9999"))
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
#[serial]
#[ignore = "requires a Docker daemon"]
async fn find_by_user_returns_newest_first() {
    let store = get_test_store().await;
    let user_id = UserId::new();

    let mut oldest = order_for(user_id, "PAY-0001");
    oldest.created_at = Utc::now() - Duration::minutes(10);
    let mut middle = order_for(user_id, "PAY-0002");
    middle.created_at = Utc::now() - Duration::minutes(5);
    let newest = order_for(user_id, "PAY-0003");
    let other_user = order_for(UserId::new(), "PAY-0004");

    store.create(oldest.clone()).await.unwrap();
    store.create(newest.clone()).await.unwrap();
    store.create(middle.clone()).await.unwrap();
    store.create(other_user).await.unwrap();

    let orders = store.find_by_user(user_id).await.unwrap();
    let ids: Vec<_> = orders.iter().map(|o| o.order_id).collect();
    assert_eq!(ids, vec![newest.order_id, middle.order_id, oldest.order_id]);
}
