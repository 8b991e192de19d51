//! DataTables server-side processing request, as sent by the client widget.
//!
//! The widget posts numbers and booleans either as JSON values or as strings
//! (form-encoded heritage), so every scalar here is parsed leniently.

use crate::domain::diagnostics::{DiagnosticKind, Diagnostics};
use crate::domain::model::{
    ColumnFilter, Direction, FilterRequest, OrderKey, PageRequest, QueryRequest,
};
use crate::infra::views::TableView;
use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use utoipa::ToSchema;

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct DataTablesSearch {
    #[serde(default, deserialize_with = "flex_string")]
    pub value: Option<String>,
    #[serde(default, deserialize_with = "flex_bool")]
    pub regex: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct DataTablesColumn {
    /// Exposed column name.
    #[serde(default, deserialize_with = "flex_string")]
    pub data: Option<String>,
    #[serde(default, deserialize_with = "flex_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "flex_bool")]
    pub searchable: Option<bool>,
    #[serde(default, deserialize_with = "flex_bool")]
    pub orderable: Option<bool>,
    #[serde(default)]
    pub search: DataTablesSearch,
}

impl DataTablesColumn {
    fn exposed(&self) -> Option<&str> {
        self.data
            .as_deref()
            .filter(|d| !d.is_empty())
            .or_else(|| self.name.as_deref().filter(|n| !n.is_empty()))
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct DataTablesOrder {
    /// Index into `columns`.
    #[serde(default, deserialize_with = "flex_i64")]
    pub column: Option<i64>,
    #[serde(default, deserialize_with = "flex_string")]
    pub dir: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct DataTablesRequest {
    /// Echoed back unchanged.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub draw: JsonValue,
    #[serde(default, deserialize_with = "flex_i64")]
    pub start: Option<i64>,
    /// `-1` requests every row (capped by the server's page size limit).
    #[serde(default, deserialize_with = "flex_i64")]
    pub length: Option<i64>,
    #[serde(default)]
    pub search: DataTablesSearch,
    #[serde(default)]
    pub columns: Vec<DataTablesColumn>,
    #[serde(default)]
    pub order: Vec<DataTablesOrder>,
}

impl DataTablesRequest {
    /// Builds the engine request for `view`. Client-side problems (bad order
    /// index, disabled ordering, unknown direction) are recorded in `diagnostics`.
    pub fn into_query(
        self,
        view: &TableView,
        max_page_size: u64,
        diagnostics: &mut Diagnostics,
    ) -> QueryRequest {
        let mut filter = FilterRequest::default();
        for column in &self.columns {
            let Some(exposed) = column.exposed() else {
                continue;
            };
            filter = filter.with_column(
                ColumnFilter::new(exposed, column.search.value.clone().unwrap_or_default())
                    .regex(column.search.regex.unwrap_or(false))
                    .searchable(column.searchable.unwrap_or(true)),
            );
        }
        if let Some(term) = self.search.value.filter(|v| !v.is_empty()) {
            filter = filter.with_global(term, self.search.regex.unwrap_or(false));
        }

        let mut order = Vec::with_capacity(self.order.len());
        for item in &self.order {
            let index = item.column.unwrap_or(-1);
            let Some(column) = usize::try_from(index).ok().and_then(|i| self.columns.get(i)) else {
                diagnostics.push(format!("#{}", index), DiagnosticKind::UnknownColumn);
                continue;
            };
            let Some(exposed) = column.exposed() else {
                diagnostics.push(format!("#{}", index), DiagnosticKind::UnknownColumn);
                continue;
            };
            if !column.orderable.unwrap_or(true) {
                diagnostics.push(exposed, DiagnosticKind::NotSortable);
                continue;
            }
            let dir = item.dir.as_deref().unwrap_or("asc");
            match dir.parse::<Direction>() {
                Ok(direction) => order.push(OrderKey::new(exposed, direction)),
                Err(value) => diagnostics.push(exposed, DiagnosticKind::InvalidDirection { value }),
            }
        }

        let offset = self.start.unwrap_or(0).max(0) as u64;
        let limit = match self.length {
            Some(len) if len > 0 => (len as u64).min(max_page_size),
            Some(_) => max_page_size,
            None => PageRequest::default().limit().min(max_page_size),
        };

        QueryRequest::new(view.table.clone(), view.columns.clone())
            .with_filter(filter)
            .with_order(order)
            .with_page(PageRequest::new(offset, limit))
            .with_draw(self.draw)
            .with_base(view.base.clone())
    }
}

fn flex_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match JsonValue::deserialize(deserializer)? {
        JsonValue::Null => Ok(None),
        JsonValue::String(s) => Ok(Some(s)),
        JsonValue::Number(n) => Ok(Some(n.to_string())),
        JsonValue::Bool(b) => Ok(Some(b.to_string())),
        other => Err(de::Error::custom(format!("expected a string, got {}", other))),
    }
}

fn flex_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    match JsonValue::deserialize(deserializer)? {
        JsonValue::Null => Ok(None),
        JsonValue::Bool(b) => Ok(Some(b)),
        JsonValue::Number(n) => Ok(Some(n.as_i64().unwrap_or(0) != 0)),
        JsonValue::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "" => Ok(None),
            "true" | "1" => Ok(Some(true)),
            "false" | "0" => Ok(Some(false)),
            _ => Err(de::Error::custom(format!("expected a boolean, got '{}'", s))),
        },
        other => Err(de::Error::custom(format!("expected a boolean, got {}", other))),
    }
}

fn flex_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match JsonValue::deserialize(deserializer)? {
        JsonValue::Null => Ok(None),
        JsonValue::Number(n) => n
            .as_i64()
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("expected an integer, got {}", n))),
        JsonValue::String(s) if s.trim().is_empty() => Ok(None),
        JsonValue::String(s) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("expected an integer, got '{}'", s))),
        other => Err(de::Error::custom(format!("expected an integer, got {}", other))),
    }
}
