//! Location collection endpoints.

use axum::{body::Bytes, extract::State, Json};
use serde_json::Value;

use crate::errors::AppError;
use crate::models::{Location, SaveResponse};
use crate::validation;
use crate::AppState;

/// GET /api/locations - The full stored collection.
pub async fn get_locations(State(state): State<AppState>) -> Result<Json<Vec<Location>>, AppError> {
    let store = state.record_store()?;
    let snapshot = store.fetch().await?;
    Ok(Json(snapshot.rows))
}

/// PUT /api/locations - Validate and commit a replacement collection.
pub async fn put_locations(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SaveResponse>, AppError> {
    let store = state.record_store()?;

    let candidate: Value = serde_json::from_slice(&body)
        .map_err(|_| AppError::BadRequest("Invalid JSON body".to_string()))?;
    let rows = validation::validate(&candidate).map_err(|e| {
        tracing::info!("Rejected replacement collection: {}", e);
        e
    })?;

    let commit = store.commit(&rows).await?;
    Ok(Json(SaveResponse { ok: true, commit }))
}

/// Any other method on /api/locations.
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
