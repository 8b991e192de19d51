//! SQL dialect capabilities.
//!
//! Shared compilation code talks to a `&dyn Dialect` only. A new database family
//! is added by implementing this trait (plus a `DatabaseAdapter` in `storage`),
//! never by branching on a dialect tag.

pub mod mysql;
pub mod postgres;

pub use mysql::MySqlDialect;
pub use postgres::PostgresDialect;

use crate::domain::predicate::Predicate;
use crate::domain::schema::TypeCategory;
use std::fmt;

pub trait Dialect: Send + Sync + fmt::Debug {
    /// Stable name used in logs, errors and cache keys.
    fn name(&self) -> &'static str;

    /// Quotes an identifier so that any embedded quote character stays part of the name.
    fn escape_identifier(&self, name: &str) -> String;

    /// Positional parameter marker for the 1-based `index`.
    fn placeholder(&self, index: usize) -> String;

    /// Maps a raw catalog type name to its category.
    fn type_category(&self, raw_type: &str) -> TypeCategory;

    /// Catalog query returning `column_name` and `column_type` for the table bound as the only parameter.
    fn describe_sql(&self) -> &'static str;

    /// Case-insensitive `LIKE`-style match of the escaped `column` against `pattern`.
    fn push_contains(&self, predicate: &mut Predicate, column: &str, pattern: String);

    /// Regular expression match of the escaped `column` against `pattern`.
    fn push_regex(&self, predicate: &mut Predicate, column: &str, pattern: String);

    /// Select expression yielding the escaped `column` as text.
    fn select_as_text(&self, column: &str) -> String;
}

/// The built-in dialect families, as named in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialectKind {
    MySql,
    Postgres,
}

impl DialectKind {
    /// Parses a configured dialect name. Unrecognized or absent values fall back to
    /// MySQL; the second element reports whether the value was recognized.
    pub fn parse(value: Option<&str>) -> (DialectKind, bool) {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("postgres") | Some("postgresql") | Some("pg") => (DialectKind::Postgres, true),
            Some("mysql") | Some("mariadb") => (DialectKind::MySql, true),
            _ => (DialectKind::MySql, false),
        }
    }

    pub fn dialect(&self) -> &'static dyn Dialect {
        match self {
            DialectKind::MySql => &MySqlDialect,
            DialectKind::Postgres => &PostgresDialect,
        }
    }

    pub fn default_port(&self) -> u16 {
        match self {
            DialectKind::MySql => 3306,
            DialectKind::Postgres => 5432,
        }
    }
}

/// Looks `name` up in a dialect's type table.
pub(crate) fn lookup_category(table: &[(&str, TypeCategory)], name: &str) -> TypeCategory {
    table
        .iter()
        .find(|(raw, _)| *raw == name)
        .map(|(_, category)| *category)
        .unwrap_or(TypeCategory::Unknown)
}

/// Lowercases a raw type name and drops any `(length)` / `(precision, scale)` / `('enum', 'values')`
/// argument list, keeping trailing modifiers such as `with time zone`.
pub(crate) fn normalize_type_name(raw: &str) -> String {
    let lower = raw.trim().to_ascii_lowercase();
    match lower.find('(') {
        Some(open) => {
            // Quoted enum/set members may contain parentheses; the list ends at the last one.
            let close = lower.rfind(')').filter(|c| *c > open).map(|c| c + 1).unwrap_or(lower.len());
            let mut out = String::with_capacity(lower.len());
            out.push_str(lower[..open].trim_end());
            out.push_str(&lower[close..]);
            out.trim().to_string()
        }
        None => lower,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_arguments_are_stripped_whole() {
        assert_eq!(normalize_type_name("VARCHAR(255)"), "varchar");
        assert_eq!(normalize_type_name("numeric(10,2)"), "numeric");
        assert_eq!(normalize_type_name("timestamp(3) with time zone"), "timestamp with time zone");
        assert_eq!(normalize_type_name("enum('a','b(c)')"), "enum");
        assert_eq!(normalize_type_name("set('x)', 'y')"), "set");
        assert_eq!(normalize_type_name("int"), "int");
    }
}
