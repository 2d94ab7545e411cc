//! Health check endpoints.

use axum::{extract::State, Json};
use serde_json::{json, Value};
use tracing::error;

use crate::app::AppState;
use crate::error::ApiError;

/// Basic health check.
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Readiness probe; verifies database connectivity.
pub async fn ready(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    sqlx::query("SELECT 1")
        .execute(&state.pool)
        .await
        .map_err(|e| {
            error!(error = %e, "Readiness check failed");
            ApiError::ServiceUnavailable("Database unavailable".to_string())
        })?;

    Ok(Json(json!({ "status": "ready" })))
}

/// Liveness probe; always succeeds while the process runs.
pub async fn live() -> Json<Value> {
    Json(json!({ "status": "alive" }))
}
