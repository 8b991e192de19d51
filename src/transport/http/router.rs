use crate::domain::model::QueryResponse;
use crate::domain::schema::TypeCategory;
use crate::transport::http::datatables::{
    DataTablesColumn, DataTablesOrder, DataTablesRequest, DataTablesSearch,
};
use crate::transport::http::handlers::{health, schema, views};
use crate::transport::http::types::{ApiResponse, ViewColumnSchema, ViewSchemaResponse};
use axum::routing::{get, post};
use axum::Router;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthcheck_handler,
        views::query_view_handler,
        schema::view_schema_handler
    ),
    components(schemas(
        ApiResponse,
        DataTablesRequest,
        DataTablesSearch,
        DataTablesColumn,
        DataTablesOrder,
        QueryResponse,
        ViewSchemaResponse,
        ViewColumnSchema,
        TypeCategory
    ))
)]
#[allow(dead_code)]
pub struct ApiDoc;

pub fn create_router(app_state: crate::transport::http::types::AppState) -> Router {
    Router::new()
        .route("/health", get(health::healthcheck_handler))
        .route("/api/views/:view", post(views::query_view_handler))
        .route("/api/views/:view/schema", get(schema::view_schema_handler))
        .with_state(app_state)
}
