//! Named table views loaded from a JSON file.
//!
//! A view is the server-side half of a request: the table, the
//! `ColumnDescriptor` set exposed to clients, and optional base conditions.
//!
//! ```json
//! {
//!   "users": {
//!     "table": "users",
//!     "columns": [
//!       { "source": "id", "searchable": false },
//!       { "source": "name", "exposed": "full_name", "transform": "uppercase" },
//!       { "source": "created_at", "transform": { "date_format": "%d/%m/%Y" } }
//!     ],
//!     "where_all": [ { "column": "deleted_at", "op": "is_null" } ]
//!   }
//! }
//! ```

use crate::domain::model::{BaseConditions, ColumnDescriptor, ComparisonOp, Condition};
use crate::domain::model::column::duplicate_exposed;
use crate::domain::predicate::builder::parse_datetime;
use crate::domain::predicate::SqlValue;
use crate::error::ConfigError;
use chrono::format::{Item, StrftimeItems};
use chrono::DateTime;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Built-in value transforms selectable from the views file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformSpec {
    Uppercase,
    Lowercase,
    Trim,
    /// `chrono` strftime format applied to date and datetime cells.
    DateFormat(String),
}

impl TransformSpec {
    fn apply(&self, value: &JsonValue) -> JsonValue {
        let Some(text) = value.as_str() else {
            return value.clone();
        };
        match self {
            TransformSpec::Uppercase => JsonValue::from(text.to_uppercase()),
            TransformSpec::Lowercase => JsonValue::from(text.to_lowercase()),
            TransformSpec::Trim => JsonValue::from(text.trim()),
            TransformSpec::DateFormat(format) => match parse_cell_datetime(text) {
                Some(dt) => JsonValue::from(dt.format(format).to_string()),
                None => value.clone(),
            },
        }
    }

    fn validate(&self) -> Result<(), String> {
        if let TransformSpec::DateFormat(format) = self {
            if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
                return Err(format!("invalid date_format '{}'", format));
            }
        }
        Ok(())
    }
}

/// Accepts what both databases print for date/time values, including `+00` offsets.
fn parse_cell_datetime(text: &str) -> Option<chrono::NaiveDateTime> {
    parse_datetime(text).or_else(|| {
        DateTime::parse_from_str(text.trim(), "%Y-%m-%d %H:%M:%S%.f%#z")
            .ok()
            .map(|dt| dt.naive_utc())
    })
}

#[derive(Debug, Deserialize)]
struct ColumnSpec {
    source: String,
    #[serde(default)]
    exposed: Option<String>,
    #[serde(default = "default_true")]
    searchable: bool,
    #[serde(default = "default_true")]
    sortable: bool,
    #[serde(default)]
    transform: Option<TransformSpec>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum OpSpec {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    IsNull,
    IsNotNull,
}

impl From<OpSpec> for ComparisonOp {
    fn from(op: OpSpec) -> Self {
        match op {
            OpSpec::Eq => ComparisonOp::Eq,
            OpSpec::Ne => ComparisonOp::Ne,
            OpSpec::Lt => ComparisonOp::Lt,
            OpSpec::Le => ComparisonOp::Le,
            OpSpec::Gt => ComparisonOp::Gt,
            OpSpec::Ge => ComparisonOp::Ge,
            OpSpec::IsNull => ComparisonOp::IsNull,
            OpSpec::IsNotNull => ComparisonOp::IsNotNull,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ConditionSpec {
    column: String,
    op: OpSpec,
    #[serde(default)]
    value: Option<JsonValue>,
}

#[derive(Debug, Deserialize)]
struct ViewSpec {
    table: String,
    columns: Vec<ColumnSpec>,
    #[serde(default)]
    where_result: Vec<ConditionSpec>,
    #[serde(default)]
    where_all: Vec<ConditionSpec>,
}

/// A configured view, ready to be turned into a `QueryRequest`.
#[derive(Debug, Clone)]
pub struct TableView {
    pub name: String,
    pub table: String,
    pub columns: Vec<ColumnDescriptor>,
    pub base: BaseConditions,
}

impl TableView {
    pub fn new(name: impl Into<String>, table: impl Into<String>, columns: Vec<ColumnDescriptor>) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            columns,
            base: BaseConditions::default(),
        }
    }

    pub fn with_base(mut self, base: BaseConditions) -> Self {
        self.base = base;
        self
    }

    fn from_spec(name: &str, spec: ViewSpec) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidView {
            view: name.to_string(),
            reason,
        };

        if spec.table.trim().is_empty() {
            return Err(invalid("table must not be empty".to_string()));
        }
        if spec.columns.is_empty() {
            return Err(invalid("at least one column is required".to_string()));
        }

        let mut columns = Vec::with_capacity(spec.columns.len());
        for column in spec.columns {
            let mut descriptor = ColumnDescriptor::new(column.source)
                .searchable(column.searchable)
                .sortable(column.sortable);
            if let Some(exposed) = column.exposed {
                descriptor = descriptor.exposed_as(exposed);
            }
            if let Some(transform) = column.transform {
                transform.validate().map_err(invalid)?;
                descriptor = descriptor.with_transform(move |value, _row| transform.apply(value));
            }
            columns.push(descriptor);
        }
        if let Some(dup) = duplicate_exposed(&columns) {
            return Err(invalid(format!("exposed name '{}' is used more than once", dup)));
        }

        let base = BaseConditions {
            result: conditions(spec.where_result).map_err(invalid)?,
            all: conditions(spec.where_all).map_err(invalid)?,
        };

        Ok(Self {
            name: name.to_string(),
            table: spec.table,
            columns,
            base,
        })
    }
}

fn conditions(specs: Vec<ConditionSpec>) -> Result<Vec<Condition>, String> {
    specs
        .into_iter()
        .map(|spec| {
            let op = ComparisonOp::from(spec.op);
            let value = match spec.value {
                Some(v) => Some(json_to_sql(&spec.column, v)?),
                None => None,
            };
            if op.takes_value() && value.is_none() {
                return Err(format!("condition on '{}' requires a value", spec.column));
            }
            Ok(Condition {
                column: spec.column,
                op,
                value: if op.takes_value() { value } else { None },
            })
        })
        .collect()
}

fn json_to_sql(column: &str, value: JsonValue) -> Result<SqlValue, String> {
    match value {
        JsonValue::String(s) => Ok(SqlValue::Text(s)),
        JsonValue::Bool(b) => Ok(SqlValue::Bool(b)),
        JsonValue::Number(n) => n
            .as_i64()
            .map(SqlValue::Int)
            .or_else(|| n.as_f64().map(SqlValue::Float))
            .ok_or_else(|| format!("value for '{}' is out of range", column)),
        other => Err(format!(
            "value for '{}' must be a string, number or boolean, got {}",
            column, other
        )),
    }
}

/// All configured views by name.
#[derive(Debug, Clone, Default)]
pub struct ViewRegistry {
    views: HashMap<String, Arc<TableView>>,
}

impl ViewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::ViewsFile {
            path: path.to_string(),
            source,
        })?;
        Self::from_json_str(path, &raw)
    }

    /// Parses a views document; `origin` only labels errors.
    pub fn from_json_str(origin: &str, raw: &str) -> Result<Self, ConfigError> {
        let specs: BTreeMap<String, ViewSpec> =
            serde_json::from_str(raw).map_err(|source| ConfigError::ViewsFormat {
                path: origin.to_string(),
                source,
            })?;

        let mut registry = Self::new();
        for (name, spec) in specs {
            let view = TableView::from_spec(&name, spec)?;
            registry.insert(view);
        }
        Ok(registry)
    }

    pub fn insert(&mut self, view: TableView) {
        self.views.insert(view.name.clone(), Arc::new(view));
    }

    pub fn get(&self, name: &str) -> Option<Arc<TableView>> {
        self.views.get(name).cloned()
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.views.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const VIEWS: &str = r#"{
        "users": {
            "table": "users",
            "columns": [
                { "source": "id", "searchable": false },
                { "source": "name", "exposed": "full_name", "transform": "uppercase" },
                { "source": "created_at", "transform": { "date_format": "%d/%m/%Y" } }
            ],
            "where_result": [ { "column": "active", "op": "eq", "value": true } ],
            "where_all": [ { "column": "deleted_at", "op": "is_null" } ]
        }
    }"#;

    #[test]
    fn loads_columns_and_conditions() {
        let registry = ViewRegistry::from_json_str("inline", VIEWS).unwrap();
        let view = registry.get("users").unwrap();
        assert_eq!(view.table, "users");
        assert_eq!(view.columns.len(), 3);
        assert!(!view.columns[0].searchable);
        assert_eq!(view.columns[1].exposed, "full_name");
        assert_eq!(view.base.result, vec![Condition::eq("active", true)]);
        assert_eq!(view.base.all, vec![Condition::is_null("deleted_at")]);
    }

    #[test]
    fn transforms_are_applied() {
        let registry = ViewRegistry::from_json_str("inline", VIEWS).unwrap();
        let view = registry.get("users").unwrap();
        let row = Default::default();

        let upper = view.columns[1].transform.as_ref().unwrap();
        assert_eq!(upper(&json!("jo"), &row), json!("JO"));

        let date = view.columns[2].transform.as_ref().unwrap();
        assert_eq!(date(&json!("2024-03-09 10:00:00+00"), &row), json!("09/03/2024"));
        assert_eq!(date(&json!("not a date"), &row), json!("not a date"));
        assert_eq!(date(&JsonValue::Null, &row), JsonValue::Null);
    }

    #[test]
    fn duplicate_exposed_names_are_rejected() {
        let raw = r#"{ "v": { "table": "t", "columns": [
            { "source": "a", "exposed": "x" }, { "source": "b", "exposed": "x" }
        ] } }"#;
        let err = ViewRegistry::from_json_str("inline", raw).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidView { .. }));
    }

    #[test]
    fn comparison_without_value_is_rejected() {
        let raw = r#"{ "v": { "table": "t", "columns": [ { "source": "a" } ],
            "where_all": [ { "column": "a", "op": "gt" } ] } }"#;
        assert!(ViewRegistry::from_json_str("inline", raw).is_err());
    }

    #[test]
    fn invalid_date_format_is_rejected() {
        let raw = r#"{ "v": { "table": "t", "columns": [
            { "source": "a", "transform": { "date_format": "%Q" } }
        ] } }"#;
        assert!(ViewRegistry::from_json_str("inline", raw).is_err());
    }
}
