//! PostgreSQL-backed order store.

use async_trait::async_trait;
use common::{Money, OrderId, PaymentId, UserId};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{Order, OrderLine, OrderStore, OrderStoreError, Result};

/// PostgreSQL-backed order store implementation.
///
/// Order lines are stored as a JSONB column; the totals are flattened into
/// their own columns so queries never have to unpack the lines.
#[derive(Clone)]
pub struct PostgresOrderStore {
    pool: PgPool,
}

impl PostgresOrderStore {
    /// Creates a new PostgreSQL order store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_order(row: PgRow) -> Result<Order> {
        let lines_json: serde_json::Value = row.try_get("lines")?;
        let lines: Vec<OrderLine> = serde_json::from_value(lines_json)?;

        Ok(Order {
            order_id: OrderId::from_uuid(row.try_get::<Uuid, _>("order_id")?),
            user_id: UserId::from_uuid(row.try_get::<Uuid, _>("user_id")?),
            payment_id: PaymentId::new(row.try_get::<String, _>("payment_id")?),
            lines,
            subtotal: Money::from_cents(row.try_get("subtotal_cents")?),
            tax: Money::from_cents(row.try_get("tax_cents")?),
            total: Money::from_cents(row.try_get("total_cents")?),
            created_at: row.try_get("created_at")?,
        })
    }
}

#[async_trait]
impl OrderStore for PostgresOrderStore {
    async fn create(&self, order: Order) -> Result<()> {
        let lines_json = serde_json::to_value(&order.lines)?;

        sqlx::query(
            r#"
            INSERT INTO orders (order_id, user_id, payment_id, lines, subtotal_cents, tax_cents, total_cents, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(order.order_id.as_uuid())
        .bind(order.user_id.as_uuid())
        .bind(order.payment_id.as_str())
        .bind(lines_json)
        .bind(order.subtotal.cents())
        .bind(order.tax.cents())
        .bind(order.total.cents())
        .bind(order.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e {
                if db_err.constraint() == Some("orders_pkey") {
                    return OrderStoreError::Duplicate(order.order_id);
                }
                if db_err.constraint() == Some("idx_orders_payment") {
                    return OrderStoreError::DuplicatePayment(order.payment_id.clone());
                }
            }
            OrderStoreError::Database(e)
        })?;

        Ok(())
    }

    async fn find_by_order_id(&self, order_id: OrderId) -> Result<Option<Order>> {
        let row: Option<PgRow> = sqlx::query(
            r#"
            SELECT order_id, user_id, payment_id, lines, subtotal_cents, tax_cents, total_cents, created_at
            FROM orders
            WHERE order_id = $1
            "#,
        )
        .bind(order_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_order).transpose()
    }

    async fn find_by_payment_id(&self, payment_id: &PaymentId) -> Result<Option<Order>> {
        let row: Option<PgRow> = sqlx::query(
            r#"
            SELECT order_id, user_id, payment_id, lines, subtotal_cents, tax_cents, total_cents, created_at
            FROM orders
            WHERE payment_id = $1
            "#,
        )
        .bind(payment_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_order).transpose()
    }

    async fn find_by_user(&self, user_id: UserId) -> Result<Vec<Order>> {
        let rows = sqlx::query(
            r#"
            SELECT order_id, user_id, payment_id, lines, subtotal_cents, tax_cents, total_cents, created_at
            FROM orders
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_order).collect()
    }
}
