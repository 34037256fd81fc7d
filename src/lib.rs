//! Watchlist backend
//!
//! Keeps the weather watch list as one JSON file in a Git repository and
//! exposes it over HTTP with compare-and-swap writes. The `session` module is
//! the client side: local edits reconciled against that endpoint.

pub mod api;
pub mod auth;
pub mod config;
pub mod errors;
pub mod models;
pub mod session;
pub mod store;
pub mod validation;

use std::sync::Arc;

use axum::{
    middleware,
    routing::get,
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::{Config, ConfigError};
use store::{GitHubContents, RecordStore};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            http: reqwest::Client::new(),
        }
    }

    /// Record store for this request; fails if repository settings are missing.
    pub fn record_store(&self) -> Result<RecordStore<GitHubContents>, ConfigError> {
        let settings = self.config.github()?;
        let path = settings.file_path.clone();
        let branch = settings.branch.clone();
        Ok(RecordStore::new(
            GitHubContents::new(self.http.clone(), settings),
            path,
            branch,
        ))
    }
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_key = state.config.api_key.clone();

    let api_routes = Router::new()
        .route(
            "/locations",
            get(api::get_locations)
                .put(api::put_locations)
                .fallback(api::method_not_allowed),
        )
        .layer(middleware::from_fn(move |req, next| {
            auth::api_key_layer(api_key.clone(), req, next)
        }));

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
