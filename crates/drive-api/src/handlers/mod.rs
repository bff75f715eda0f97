//! HTTP request handlers, one module per resource.

pub mod drive;
pub mod file;
pub mod folder;
pub mod health;

use axum::Json;

use drive_service::CascadeReport;

use crate::dto::response::ApiResponse;

/// Wrap a cascade report, flagging partial completion in the message.
pub(crate) fn cascade_response(report: CascadeReport) -> Json<ApiResponse<CascadeReport>> {
    if report.is_complete() {
        return Json(ApiResponse::ok(report));
    }
    let message = format!(
        "{} completed with {} failed step(s)",
        report.transition,
        report.failures.len()
    );
    Json(ApiResponse::with_message(report, message))
}
