use crate::app::DataTableService;
use crate::domain::schema::TypeCategory;
use crate::infra::views::ViewRegistry;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<DataTableService>,
    pub views: Arc<ViewRegistry>,
    /// Upper bound for `length`; also used when the client asks for all rows.
    pub max_page_size: u64,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub data: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiResponse {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// One exposed column of a view, joined with the live catalog.
#[derive(Serialize, Debug, ToSchema)]
pub struct ViewColumnSchema {
    pub exposed: String,
    pub source: String,
    pub searchable: bool,
    pub sortable: bool,
    /// Absent when the source column does not exist in the table.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<TypeCategory>,
}

#[derive(Serialize, Debug, ToSchema)]
pub struct ViewSchemaResponse {
    pub view: String,
    pub table: String,
    pub dialect: String,
    pub columns: Vec<ViewColumnSchema>,
}

/// Header carrying the number of diagnostics recorded for a request.
pub const DIAGNOSTICS_HEADER: &str = "x-table-view-diagnostics";
