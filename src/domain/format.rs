//! Row decoding and output record formatting.

use crate::domain::model::{ColumnDescriptor, Record, Row};
use crate::domain::schema::TypeCategory;
use serde_json::{Number, Value as JsonValue};

/// Converts a cell selected as text into JSON according to its column category.
///
/// Values that do not parse for their category are kept as strings.
pub fn cell_to_json(text: Option<String>, category: TypeCategory) -> JsonValue {
    let Some(text) = text else {
        return JsonValue::Null;
    };
    match category {
        TypeCategory::Integer => {
            if let Ok(i) = text.parse::<i64>() {
                return JsonValue::from(i);
            }
            if let Ok(u) = text.parse::<u64>() {
                return JsonValue::from(u);
            }
            JsonValue::String(text)
        }
        TypeCategory::Float => text
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::String(text)),
        TypeCategory::Boolean => match text.as_str() {
            "t" | "true" | "1" => JsonValue::Bool(true),
            "f" | "false" | "0" => JsonValue::Bool(false),
            _ => JsonValue::String(text),
        },
        _ => JsonValue::String(text),
    }
}

/// Maps raw rows to output records: `row[source]`, transformed if requested, under `exposed`.
///
/// Missing cells are read as `null`.
pub fn format_rows(rows: &[Row], columns: &[ColumnDescriptor]) -> Vec<Record> {
    rows.iter()
        .map(|row| {
            let mut record = Record::new();
            for column in columns {
                let raw = row.get(&column.source).cloned().unwrap_or(JsonValue::Null);
                let value = match &column.transform {
                    Some(transform) => transform(&raw, row),
                    None => raw,
                };
                record.insert(column.exposed.clone(), value);
            }
            record
        })
        .collect()
}
