use anyhow::Context;
use tracing_subscriber::EnvFilter;

use cardvault_api::database::DatabaseManager;
use cardvault_api::{api, AppConfig, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cardvault_api=info,tower_http=info")),
        )
        .init();

    let config = AppConfig::from_env()?;
    tracing::info!("Starting Cardvault API in {:?} mode", config.environment);

    let pool = DatabaseManager::connect(&config.database).await?;
    DatabaseManager::migrate(&pool).await?;

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Cardvault API listening on http://{}", bind_addr);

    let app = api::router(AppState::new(pool, config));
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
