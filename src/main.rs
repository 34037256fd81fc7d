//! Watchlist backend server.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use watchlist_backend::config::Config;
use watchlist_backend::{create_router, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);
    if config.log_json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting watchlist backend");
    tracing::info!("Bind address: {}", config.bind_addr);

    match config.github() {
        Ok(settings) => tracing::info!(
            "Record file: {}/{} {}@{}",
            settings.owner,
            settings.repo,
            settings.file_path,
            settings.branch
        ),
        Err(e) => tracing::warn!("{}; every /api request will fail until it is set", e),
    }

    if config.api_key.is_none() {
        tracing::warn!("No API key configured (WATCHLIST_API_KEY). Authentication is disabled!");
    }

    let bind_addr = config.bind_addr;
    let app = create_router(AppState::new(config));

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!("Server listening on {}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
