use anyhow::Context;

use vault_api::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    vault_observability::init();

    let config = AppConfig::from_env().context("failed to read configuration")?;
    let app = vault_api::app::build_app(&config)
        .await
        .context("failed to build application")?;

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
