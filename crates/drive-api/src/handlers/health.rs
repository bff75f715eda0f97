//! Health check handler.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use crate::dto::response::{ApiResponse, HealthResponse};
use crate::state::AppState;

/// GET /api/health
///
/// Answers 503 when the database or the blob store is unreachable.
pub async fn health(
    State(state): State<AppState>,
) -> (StatusCode, Json<ApiResponse<HealthResponse>>) {
    let database = match &state.database {
        None => "memory",
        Some(db) => match db.health_check().await {
            Ok(true) => "connected",
            Ok(false) | Err(_) => "unavailable",
        },
    };
    let storage = match state.blob_store.health_check().await {
        Ok(true) => "available",
        Ok(false) | Err(_) => "unavailable",
    };

    let healthy = database != "unavailable" && storage != "unavailable";
    if !healthy {
        tracing::warn!(database, storage, "Health check failed");
    }
    let status = if healthy { "ok" } else { "degraded" };
    let code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        code,
        Json(ApiResponse::ok(HealthResponse {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            database: database.to_string(),
            storage: storage.to_string(),
        })),
    )
}
