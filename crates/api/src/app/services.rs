//! Service wiring: stores, gateway and the application services on top.

use std::sync::Arc;

use thiserror::Error;

use vault_infra::services::{CheckoutOrchestrator, ProductMutationService};
use vault_infra::store::{InMemoryOrderStore, InMemoryProductStore, OrderStore, ProductStore};
use vault_payments::{PaymentError, PaymentGatewayAdapter};

use crate::config::AppConfig;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("payment gateway could not be configured: {0}")]
    Gateway(#[from] PaymentError),

    #[error("database unavailable: {0}")]
    Database(String),
}

#[derive(Debug)]
pub struct AppServices {
    pub products: ProductMutationService,
    pub checkout: CheckoutOrchestrator,
}

impl AppServices {
    pub fn new(
        config: &AppConfig,
        products: Arc<dyn ProductStore>,
        orders: Arc<dyn OrderStore>,
        payments: PaymentGatewayAdapter,
    ) -> Self {
        Self {
            products: ProductMutationService::new(products, config.photo_policy),
            checkout: CheckoutOrchestrator::new(payments, orders),
        }
    }
}

/// Build services from configuration.
///
/// Postgres is used when the `postgres` feature is enabled and
/// `DATABASE_URL` is set; in-memory stores otherwise.
pub async fn build_services(config: &AppConfig) -> Result<AppServices, StartupError> {
    let payments = PaymentGatewayAdapter::from_config(config.gateway.clone())?;
    let (products, orders) = build_stores(config).await?;

    tracing::info!(
        gateway = payments.environment().as_str(),
        photo_policy = ?config.photo_policy,
        "services ready"
    );
    Ok(AppServices::new(config, products, orders, payments))
}

type Stores = (Arc<dyn ProductStore>, Arc<dyn OrderStore>);

#[cfg(feature = "postgres")]
async fn build_stores(config: &AppConfig) -> Result<Stores, StartupError> {
    use vault_infra::store::{PostgresOrderStore, PostgresProductStore, ensure_schema};

    let Some(database_url) = config.database_url.as_deref() else {
        tracing::warn!("DATABASE_URL not set; using in-memory stores");
        return Ok(in_memory_stores());
    };

    let pool = sqlx::PgPool::connect(database_url)
        .await
        .map_err(|e| StartupError::Database(e.to_string()))?;
    ensure_schema(&pool)
        .await
        .map_err(|e| StartupError::Database(e.to_string()))?;

    tracing::info!("using postgres stores");
    Ok((
        Arc::new(PostgresProductStore::new(pool.clone())),
        Arc::new(PostgresOrderStore::new(pool)),
    ))
}

#[cfg(not(feature = "postgres"))]
async fn build_stores(config: &AppConfig) -> Result<Stores, StartupError> {
    if config.database_url.is_some() {
        tracing::warn!("DATABASE_URL is set but the postgres feature is disabled; using in-memory stores");
    }
    Ok(in_memory_stores())
}

fn in_memory_stores() -> Stores {
    (
        Arc::new(InMemoryProductStore::new()),
        Arc::new(InMemoryOrderStore::new()),
    )
}
