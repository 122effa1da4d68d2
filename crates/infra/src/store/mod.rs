//! Catalog and order persistence.
//!
//! Stores are shared behind `Arc` by the services. Last writer wins; the
//! only uniqueness rule enforced is the product slug.

pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use vault_catalog::Product;
use vault_core::ProductId;
use vault_orders::Order;

pub use memory::{InMemoryOrderStore, InMemoryProductStore};
#[cfg(feature = "postgres")]
pub use postgres::{PostgresOrderStore, PostgresProductStore, ensure_schema};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    /// Uniqueness violation (slug already taken).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Stored data could not be mapped back into a domain value.
    #[error("corrupt record: {0}")]
    Corrupt(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn kind(&self) -> &'static str {
        match self {
            StoreError::NotFound => "not_found",
            StoreError::Conflict(_) => "conflict",
            StoreError::Corrupt(_) => "corrupt",
            StoreError::Backend(_) => "backend",
        }
    }
}

#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Insert a new product. Fails with `Conflict` when the slug is taken.
    async fn insert(&self, product: Product) -> Result<Product, StoreError>;

    /// Replace the product with the same id. `NotFound` if it does not exist.
    async fn update(&self, product: Product) -> Result<Product, StoreError>;

    async fn delete(&self, id: ProductId) -> Result<(), StoreError>;

    async fn get(&self, id: ProductId) -> Result<Option<Product>, StoreError>;

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Product>, StoreError>;

    /// Newest first, at most `limit` entries, photo bytes stripped.
    async fn list(&self, limit: usize) -> Result<Vec<Product>, StoreError>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn insert(&self, order: Order) -> Result<Order, StoreError>;
}

#[async_trait]
impl<S> ProductStore for Arc<S>
where
    S: ProductStore + ?Sized,
{
    async fn insert(&self, product: Product) -> Result<Product, StoreError> {
        (**self).insert(product).await
    }

    async fn update(&self, product: Product) -> Result<Product, StoreError> {
        (**self).update(product).await
    }

    async fn delete(&self, id: ProductId) -> Result<(), StoreError> {
        (**self).delete(id).await
    }

    async fn get(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        (**self).get(id).await
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Product>, StoreError> {
        (**self).get_by_slug(slug).await
    }

    async fn list(&self, limit: usize) -> Result<Vec<Product>, StoreError> {
        (**self).list(limit).await
    }
}

#[async_trait]
impl<S> OrderStore for Arc<S>
where
    S: OrderStore + ?Sized,
{
    async fn insert(&self, order: Order) -> Result<Order, StoreError> {
        (**self).insert(order).await
    }
}
