//! Per-request deadline.

use std::time::Duration;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::warn;

use drive_core::error::{AppError, ErrorKind};

use crate::error::ApiError;
use crate::state::AppState;

/// Abort handlers that have not produced a response within
/// `server.request_timeout_seconds`. A value of 0 disables the deadline.
///
/// Only the time to the response head is bounded; streamed download
/// bodies are not cut off. Mounted as a route layer, so folder cascades
/// registered after it are never cut short.
pub async fn request_timeout(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let seconds = state.config.server.request_timeout_seconds;
    if seconds == 0 {
        return next.run(request).await;
    }

    let path = request.uri().path().to_string();
    match tokio::time::timeout(Duration::from_secs(seconds), next.run(request)).await {
        Ok(response) => response,
        Err(_) => {
            warn!(path = %path, seconds, "Request timed out");
            ApiError(AppError::new(
                ErrorKind::Internal,
                format!("Request did not complete within {seconds}s"),
            ))
            .into_response()
        }
    }
}
