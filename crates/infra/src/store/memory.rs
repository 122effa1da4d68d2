//! In-memory stores for tests/dev.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use vault_catalog::Product;
use vault_core::{Entity, OrderId, ProductId};
use vault_orders::Order;

use super::{OrderStore, ProductStore, StoreError};

fn poisoned() -> StoreError {
    StoreError::Backend("in-memory store lock poisoned".to_string())
}

#[derive(Debug, Default)]
pub struct InMemoryProductStore {
    inner: RwLock<HashMap<ProductId, Product>>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slug_taken(map: &HashMap<ProductId, Product>, slug: &str, except: ProductId) -> bool {
        map.values()
            .any(|p| p.slug() == slug && p.id_typed() != except)
    }
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn insert(&self, product: Product) -> Result<Product, StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        if map.contains_key(product.id()) {
            return Err(StoreError::Conflict(format!(
                "product {} already exists",
                product.id()
            )));
        }
        if Self::slug_taken(&map, product.slug(), product.id_typed()) {
            return Err(StoreError::Conflict(format!(
                "slug '{}' is already in use",
                product.slug()
            )));
        }
        map.insert(product.id_typed(), product.clone());
        Ok(product)
    }

    async fn update(&self, product: Product) -> Result<Product, StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        if !map.contains_key(product.id()) {
            return Err(StoreError::NotFound);
        }
        if Self::slug_taken(&map, product.slug(), product.id_typed()) {
            return Err(StoreError::Conflict(format!(
                "slug '{}' is already in use",
                product.slug()
            )));
        }
        map.insert(product.id_typed(), product.clone());
        Ok(product)
    }

    async fn delete(&self, id: ProductId) -> Result<(), StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        map.remove(&id).map(|_| ()).ok_or(StoreError::NotFound)
    }

    async fn get(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.get(&id).cloned())
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Product>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.values().find(|p| p.slug() == slug).cloned())
    }

    async fn list(&self, limit: usize) -> Result<Vec<Product>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        let mut products: Vec<Product> = map.values().map(Product::without_photo).collect();
        products.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        products.truncate(limit);
        Ok(products)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryOrderStore {
    inner: RwLock<HashMap<OrderId, Order>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub(crate) fn placed(&self) -> Vec<Order> {
        self.inner
            .read()
            .map(|m| m.values().cloned().collect())
            .unwrap_or_default()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.placed().is_empty()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn insert(&self, order: Order) -> Result<Order, StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        if map.contains_key(&order.id) {
            return Err(StoreError::Conflict(format!("order {} already exists", order.id)));
        }
        map.insert(order.id, order.clone());
        Ok(order)
    }
}
