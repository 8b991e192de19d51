use crate::domain::diagnostics::Diagnostics;
use crate::domain::model::request::Draw;
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};
use utoipa::ToSchema;

/// One output record keyed by exposed name.
pub type Record = Map<String, JsonValue>;

/// The fixed response envelope.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    #[schema(value_type = Object)]
    pub draw: Draw,
    pub records_total: u64,
    pub records_filtered: u64,
    #[schema(value_type = Vec<Object>)]
    pub data: Vec<Record>,
}

/// A response together with everything diagnosed while compiling it.
#[derive(Debug, Clone)]
pub struct QueryOutcome {
    pub response: QueryResponse,
    pub diagnostics: Diagnostics,
}
