use crate::transport::http::handlers::common::{engine_error_response, ensure_view};
use crate::transport::http::types::{ApiResponse, AppState, ViewColumnSchema, ViewSchemaResponse};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

#[utoipa::path(
    get,
    path = "/api/views/{view}/schema",
    params(
        ("view" = String, Path, description = "Configured view name (e.g. users)")
    ),
    responses(
        (status = 200, description = "Exposed columns with their live types", body = ViewSchemaResponse),
        (status = 404, description = "Unknown view", body = ApiResponse),
        (status = 500, description = "Internal server error", body = ApiResponse)
    )
)]
pub async fn view_schema_handler(
    State(state): State<AppState>,
    Path(view_name): Path<String>,
) -> impl IntoResponse {
    let view = match ensure_view(&state, view_name.trim()) {
        Ok(v) => v,
        Err(resp) => return resp.into_response(),
    };

    let schema = match state.service.describe(&view.table).await {
        Ok(s) => s,
        Err(e) => return engine_error_response(&e).into_response(),
    };

    let columns = view
        .columns
        .iter()
        .map(|descriptor| {
            let live = schema.iter().find(|c| c.source == descriptor.source);
            ViewColumnSchema {
                exposed: descriptor.exposed.clone(),
                source: descriptor.source.clone(),
                searchable: descriptor.searchable,
                sortable: descriptor.sortable,
                raw_type: live.map(|c| c.raw_type.clone()),
                category: live.map(|c| c.category),
            }
        })
        .collect();

    (
        StatusCode::OK,
        Json(ViewSchemaResponse {
            view: view.name.clone(),
            table: view.table.clone(),
            dialect: state.service.dialect().name().to_string(),
            columns,
        }),
    )
        .into_response()
}
