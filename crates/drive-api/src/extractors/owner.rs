//! `Owner` extractor: reads the owner identity set by the upstream
//! authentication layer.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use drive_core::error::AppError;
use drive_service::context::RequestContext;

use crate::error::ApiError;
use crate::state::AppState;

/// Owner of the current request, available in handlers.
#[derive(Debug, Clone)]
pub struct Owner(pub RequestContext);

impl std::ops::Deref for Owner {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for Owner {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = state.config.server.owner_header.as_str();
        let owner_id = parts
            .headers
            .get(header)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| AppError::authentication(format!("Missing {header} header")))?;

        Ok(Owner(RequestContext::new(owner_id)))
    }
}
