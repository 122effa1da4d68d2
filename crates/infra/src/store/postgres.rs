//! Postgres-backed stores.
//!
//! ## Error Mapping
//!
//! | SQLx error | PostgreSQL code | StoreError |
//! |------------|-----------------|------------|
//! | Database (unique violation) | `23505` | `Conflict` |
//! | Database (other) | any other | `Backend` |
//! | RowNotFound | n/a | `NotFound` |
//! | Other | n/a | `Backend` |

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::instrument;
use uuid::Uuid;

use vault_catalog::{Product, ProductParts, ProductPhoto};
use vault_core::ProductId;
use vault_orders::Order;

use super::{OrderStore, ProductStore, StoreError};

const SCHEMA: &str = include_str!("../../migrations/0001_init.sql");

/// Create the tables if they do not exist yet.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), StoreError> {
    sqlx::raw_sql(SCHEMA)
        .execute(pool)
        .await
        .map_err(|e| map_sqlx_error("ensure_schema", e))?;
    Ok(())
}

#[derive(Debug, Clone)]
pub struct PostgresProductStore {
    pool: Arc<PgPool>,
}

impl PostgresProductStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

const PRODUCT_COLUMNS: &str = "id, name, slug, description, price, category, quantity, shipping, \
     photo_data, photo_content_type, created_at, updated_at";

fn product_from_row(row: &PgRow) -> Result<Product, StoreError> {
    let corrupt = |e: sqlx::Error| StoreError::Corrupt(e.to_string());

    let quantity: i64 = row.try_get("quantity").map_err(corrupt)?;
    let quantity = u32::try_from(quantity)
        .map_err(|_| StoreError::Corrupt(format!("quantity {quantity} out of range")))?;

    let photo_data: Option<Vec<u8>> = row.try_get("photo_data").map_err(corrupt)?;
    let photo_content_type: Option<String> = row.try_get("photo_content_type").map_err(corrupt)?;
    let photo = photo_data.map(|data| ProductPhoto {
        data,
        content_type: photo_content_type.unwrap_or_else(|| "application/octet-stream".to_string()),
    });

    Ok(Product::restore(ProductParts {
        id: ProductId::from_uuid(row.try_get::<Uuid, _>("id").map_err(corrupt)?),
        name: row.try_get("name").map_err(corrupt)?,
        slug: row.try_get("slug").map_err(corrupt)?,
        description: row.try_get("description").map_err(corrupt)?,
        price: row.try_get("price").map_err(corrupt)?,
        category: row.try_get("category").map_err(corrupt)?,
        quantity,
        shipping: row.try_get("shipping").map_err(corrupt)?,
        photo,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at").map_err(corrupt)?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at").map_err(corrupt)?,
    }))
}

#[async_trait]
impl ProductStore for PostgresProductStore {
    #[instrument(skip(self, product), fields(product_id = %product.id_typed()), err)]
    async fn insert(&self, product: Product) -> Result<Product, StoreError> {
        let photo = product.photo();
        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, slug, description, price, category, quantity, shipping,
                photo_data, photo_content_type, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(product.id_typed().as_uuid())
        .bind(product.name())
        .bind(product.slug())
        .bind(product.description())
        .bind(product.price())
        .bind(product.category())
        .bind(i64::from(product.quantity()))
        .bind(product.shipping())
        .bind(photo.map(|p| p.data.as_slice()))
        .bind(photo.map(|p| p.content_type.as_str()))
        .bind(product.created_at())
        .bind(product.updated_at())
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_product", e))?;

        Ok(product)
    }

    #[instrument(skip(self, product), fields(product_id = %product.id_typed()), err)]
    async fn update(&self, product: Product) -> Result<Product, StoreError> {
        let photo = product.photo();
        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = $2,
                slug = $3,
                description = $4,
                price = $5,
                category = $6,
                quantity = $7,
                shipping = $8,
                photo_data = COALESCE($9, photo_data),
                photo_content_type = COALESCE($10, photo_content_type),
                updated_at = $11
            WHERE id = $1
            "#,
        )
        .bind(product.id_typed().as_uuid())
        .bind(product.name())
        .bind(product.slug())
        .bind(product.description())
        .bind(product.price())
        .bind(product.category())
        .bind(i64::from(product.quantity()))
        .bind(product.shipping())
        .bind(photo.map(|p| p.data.as_slice()))
        .bind(photo.map(|p| p.content_type.as_str()))
        .bind(product.updated_at())
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_product", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(product)
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn delete(&self, id: ProductId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_product", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn get(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_product", e))?;

        row.as_ref().map(product_from_row).transpose()
    }

    #[instrument(skip(self), err)]
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE slug = $1"))
            .bind(slug)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_product_by_slug", e))?;

        row.as_ref().map(product_from_row).transpose()
    }

    #[instrument(skip(self), err)]
    async fn list(&self, limit: usize) -> Result<Vec<Product>, StoreError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = sqlx::query(
            r#"
            SELECT id, name, slug, description, price, category, quantity, shipping,
                   NULL::BYTEA AS photo_data, NULL::TEXT AS photo_content_type,
                   created_at, updated_at
            FROM products
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_products", e))?;

        rows.iter().map(product_from_row).collect()
    }
}

#[derive(Debug, Clone)]
pub struct PostgresOrderStore {
    pool: Arc<PgPool>,
}

impl PostgresOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

#[async_trait]
impl OrderStore for PostgresOrderStore {
    #[instrument(skip(self, order), fields(order_id = %order.id, buyer = %order.buyer), err)]
    async fn insert(&self, order: Order) -> Result<Order, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO orders (id, products, payment, buyer, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(Json(&order.products))
        .bind(&order.payment)
        .bind(order.buyer.as_uuid())
        .bind(order.status.as_str())
        .bind(order.created_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_order", e))?;

        Ok(order)
    }
}

/// Map SQLx errors to `StoreError`.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => StoreError::Conflict(msg),
                _ => StoreError::Backend(msg),
            }
        }
        sqlx::Error::RowNotFound => StoreError::NotFound,
        sqlx::Error::PoolClosed => {
            StoreError::Backend(format!("connection pool closed in {}", operation))
        }
        _ => StoreError::Backend(format!("sqlx error in {}: {}", operation, err)),
    }
}
