//! Normalized column type categories discovered from live database metadata.

use serde::Serialize;
use std::fmt;
use utoipa::ToSchema;

/// The normalized type class a raw database column type is mapped to.
///
/// Predicate construction dispatches on this value only, never on the raw
/// dialect type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TypeCategory {
    Text,
    Integer,
    Float,
    Boolean,
    Date,
    DateTime,
    Unknown,
}

impl TypeCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeCategory::Text => "text",
            TypeCategory::Integer => "integer",
            TypeCategory::Float => "float",
            TypeCategory::Boolean => "boolean",
            TypeCategory::Date => "date",
            TypeCategory::DateTime => "datetime",
            TypeCategory::Unknown => "unknown",
        }
    }
}

impl fmt::Display for TypeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One column of a table as reported by the metadata catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct SchemaColumnType {
    /// Physical column name.
    pub source: String,
    /// Raw type name as reported by the catalog (e.g. `int4`, `tinyint(1)`).
    pub raw_type: String,
    pub category: TypeCategory,
}

impl SchemaColumnType {
    pub fn new(source: impl Into<String>, raw_type: impl Into<String>, category: TypeCategory) -> Self {
        Self {
            source: source.into(),
            raw_type: raw_type.into(),
            category,
        }
    }
}
