use crate::domain::diagnostics::Diagnostics;
use crate::domain::model::QueryResponse;
use crate::transport::http::datatables::DataTablesRequest;
use crate::transport::http::handlers::common::{engine_error_response, ensure_view};
use crate::transport::http::types::{ApiResponse, AppState, DIAGNOSTICS_HEADER};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::Json;

#[utoipa::path(
    post,
    path = "/api/views/{view}",
    params(
        ("view" = String, Path, description = "Configured view name (e.g. users)")
    ),
    request_body = DataTablesRequest,
    responses(
        (status = 200, description = "One page of rows in the DataTables envelope", body = QueryResponse),
        (status = 400, description = "Bad request", body = ApiResponse),
        (status = 404, description = "Unknown view", body = ApiResponse),
        (status = 422, description = "Unprocessable entity (invalid JSON body)", body = ApiResponse),
        (status = 500, description = "Internal server error", body = ApiResponse),
        (status = 504, description = "Query timed out", body = ApiResponse)
    )
)]
pub async fn query_view_handler(
    State(state): State<AppState>,
    Path(view_name): Path<String>,
    request: Result<Json<DataTablesRequest>, JsonRejection>,
) -> impl IntoResponse {
    let view = match ensure_view(&state, view_name.trim()) {
        Ok(v) => v,
        Err(resp) => return resp.into_response(),
    };

    let Json(request) = match request {
        Ok(v) => v,
        Err(e) => {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ApiResponse::error(format!(
                    "Invalid JSON body: {} (expected a DataTables server-side request)",
                    e
                ))),
            )
                .into_response();
        }
    };

    let mut diagnostics = Diagnostics::new();
    let query = request.into_query(&view, state.max_page_size, &mut diagnostics);

    match state.service.process(query).await {
        Ok(outcome) => {
            diagnostics.extend(outcome.diagnostics);
            let mut response = (StatusCode::OK, Json(outcome.response)).into_response();
            response
                .headers_mut()
                .insert(DIAGNOSTICS_HEADER, HeaderValue::from(diagnostics.len()));
            response
        }
        Err(e) => engine_error_response(&e).into_response(),
    }
}
