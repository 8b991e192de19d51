use crate::error::EngineError;
use crate::infra::views::TableView;
use crate::transport::http::types::{ApiResponse, AppState};
use axum::http::StatusCode;
use axum::Json;
use std::sync::Arc;

pub type ErrorResponse = (StatusCode, Json<ApiResponse>);

pub fn ensure_view(state: &AppState, view_name: &str) -> Result<Arc<TableView>, ErrorResponse> {
    state.views.get(view_name).ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error(format!("View '{}' is not configured", view_name))),
        )
    })
}

pub fn engine_error_response(err: &EngineError) -> ErrorResponse {
    let status = match err {
        EngineError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        EngineError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        EngineError::Schema(_) | EngineError::Execution(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        tracing::error!(error = %err, "request failed");
    } else {
        tracing::info!(error = %err, "request rejected");
    }
    (status, Json(ApiResponse::error(err.to_string())))
}
