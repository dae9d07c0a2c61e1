//! PostgreSQL-backed catalog store.

use async_trait::async_trait;
use common::{ItemId, Money};
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::{CatalogError, CatalogItem, CatalogStore, Result};

/// PostgreSQL-backed catalog store implementation.
#[derive(Clone)]
pub struct PostgresCatalogStore {
    pool: PgPool,
}

impl PostgresCatalogStore {
    /// Creates a new PostgreSQL catalog store.
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

    fn row_to_item(row: PgRow) -> Result<CatalogItem> {
        let quantity: i64 = row.try_get("total_quantity")?;
        let total_quantity = u32::try_from(quantity).map_err(|_| {
            CatalogError::Database(sqlx::Error::ColumnDecode {
                index: "total_quantity".into(),
                source: Box::new(std::io::Error::other("stock total out of range")),
            })
        })?;

        Ok(CatalogItem {
            id: ItemId::new(row.try_get::<String, _>("id")?),
            name: row.try_get("name")?,
            price: Money::from_cents(row.try_get("price_cents")?),
            total_quantity,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Escapes LIKE metacharacters so user input matches as a literal substring.
fn escape_like(query: &str) -> String {
    query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[async_trait]
impl CatalogStore for PostgresCatalogStore {
    async fn get(&self, item_id: &ItemId) -> Result<Option<CatalogItem>> {
        let row: Option<PgRow> = sqlx::query(
            r#"
            SELECT id, name, price_cents, total_quantity, created_at, updated_at
            FROM catalog_items
            WHERE id = $1
            "#,
        )
        .bind(item_id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_item).transpose()
    }

    async fn insert(&self, item: CatalogItem) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO catalog_items (id, name, price_cents, total_quantity, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(item.id.as_str())
        .bind(&item.name)
        .bind(item.price.cents())
        .bind(i64::from(item.total_quantity))
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.constraint() == Some("catalog_items_pkey")
            {
                return CatalogError::Duplicate(item.id.clone());
            }
            CatalogError::Database(e)
        })?;

        Ok(())
    }

    async fn update(&self, item: CatalogItem) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE catalog_items
            SET name = $2, price_cents = $3, total_quantity = $4, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(item.id.as_str())
        .bind(&item.name)
        .bind(item.price.cents())
        .bind(i64::from(item.total_quantity))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CatalogError::NotFound(item.id));
        }
        Ok(())
    }

    async fn set_quantity(&self, item_id: &ItemId, quantity: u32) -> Result<CatalogItem> {
        let row: Option<PgRow> = sqlx::query(
            r#"
            UPDATE catalog_items
            SET total_quantity = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, price_cents, total_quantity, created_at, updated_at
            "#,
        )
        .bind(item_id.as_str())
        .bind(i64::from(quantity))
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Self::row_to_item(row),
            None => Err(CatalogError::NotFound(item_id.clone())),
        }
    }

    async fn decrement_quantity(&self, item_id: &ItemId, amount: u32) -> Result<()> {
        // Single guarded UPDATE so concurrent decrements cannot go negative.
        let result = sqlx::query(
            r#"
            UPDATE catalog_items
            SET total_quantity = total_quantity - $2, updated_at = NOW()
            WHERE id = $1 AND total_quantity >= $2
            "#,
        )
        .bind(item_id.as_str())
        .bind(i64::from(amount))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            // Read back to tell a missing item from a short one.
            let available: Option<i64> =
                sqlx::query_scalar("SELECT total_quantity FROM catalog_items WHERE id = $1")
                    .bind(item_id.as_str())
                    .fetch_optional(&self.pool)
                    .await?;

            return Err(match available {
                Some(available) => CatalogError::InsufficientQuantity {
                    item_id: item_id.clone(),
                    requested: amount,
                    available: u32::try_from(available).unwrap_or(0),
                },
                None => CatalogError::NotFound(item_id.clone()),
            });
        }
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<CatalogItem>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, price_cents, total_quantity, created_at, updated_at
            FROM catalog_items
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_item).collect()
    }

    async fn search_by_name(&self, query: &str) -> Result<Vec<CatalogItem>> {
        let pattern = format!("%{}%", escape_like(query));
        let rows = sqlx::query(
            r#"
            SELECT id, name, price_cents, total_quantity, created_at, updated_at
            FROM catalog_items
            WHERE name ILIKE $1
            ORDER BY id ASC
            "#,
        )
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_item).collect()
    }

    async fn list_below_price(&self, max_price: Money) -> Result<Vec<CatalogItem>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, price_cents, total_quantity, created_at, updated_at
            FROM catalog_items
            WHERE price_cents < $1
            ORDER BY id ASC
            "#,
        )
        .bind(max_price.cents())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_item).collect()
    }
}
