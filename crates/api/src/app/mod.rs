//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: stores, gateway and application services
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: request/response DTOs and JSON mapping helpers
//! - `errors.rs`: response envelopes

use std::sync::Arc;

use axum::{Extension, Router, extract::DefaultBodyLimit, routing::get};
use tower::ServiceBuilder;

use crate::config::AppConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router from configuration (used by `main.rs`).
pub async fn build_app(config: &AppConfig) -> Result<Router, services::StartupError> {
    let services = Arc::new(services::build_services(config).await?);
    Ok(build_router(config, services))
}

/// Router over already-built services.
pub fn build_router(config: &AppConfig, services: Arc<services::AppServices>) -> Router {
    let jwt = Arc::new(vault_auth::Hs256JwtValidator::new(config.jwt_secret.as_bytes()));
    let auth_state = middleware::AuthState { jwt };

    Router::new()
        .route("/health", get(routes::system::health))
        .nest("/api/v1/product", routes::router(auth_state))
        .layer(
            ServiceBuilder::new()
                .layer(Extension(services))
                .layer(DefaultBodyLimit::max(config.max_upload_bytes)),
        )
}
