use crate::dialect::{lookup_category, normalize_type_name, Dialect};
use crate::domain::predicate::Predicate;
use crate::domain::schema::TypeCategory;

/// `COLUMN_TYPE` names after the length suffix and sign modifiers are removed.
/// `tinyint(1)` is matched before normalization.
pub const MYSQL_TYPES: &[(&str, TypeCategory)] = &[
    ("char", TypeCategory::Text),
    ("varchar", TypeCategory::Text),
    ("text", TypeCategory::Text),
    ("tinytext", TypeCategory::Text),
    ("mediumtext", TypeCategory::Text),
    ("longtext", TypeCategory::Text),
    ("enum", TypeCategory::Text),
    ("set", TypeCategory::Text),
    ("tinyint", TypeCategory::Integer),
    ("smallint", TypeCategory::Integer),
    ("mediumint", TypeCategory::Integer),
    ("int", TypeCategory::Integer),
    ("integer", TypeCategory::Integer),
    ("bigint", TypeCategory::Integer),
    ("year", TypeCategory::Integer),
    ("float", TypeCategory::Float),
    ("double", TypeCategory::Float),
    ("double precision", TypeCategory::Float),
    ("real", TypeCategory::Float),
    ("decimal", TypeCategory::Float),
    ("numeric", TypeCategory::Float),
    ("bool", TypeCategory::Boolean),
    ("boolean", TypeCategory::Boolean),
    ("date", TypeCategory::Date),
    ("datetime", TypeCategory::DateTime),
    ("timestamp", TypeCategory::DateTime),
];

const SIGN_MODIFIERS: &[&str] = &[" unsigned", " signed", " zerofill"];

/// MySQL/MariaDB family: backtick identifiers, `?` placeholders.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlDialect;

impl Dialect for MySqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn escape_identifier(&self, name: &str) -> String {
        format!("`{}`", name.replace('`', "``"))
    }

    fn placeholder(&self, _index: usize) -> String {
        "?".to_string()
    }

    fn type_category(&self, raw_type: &str) -> TypeCategory {
        let mut name = raw_type.trim().to_ascii_lowercase();
        for modifier in SIGN_MODIFIERS {
            name = name.replace(modifier, "");
        }
        if name == "tinyint(1)" {
            return TypeCategory::Boolean;
        }
        lookup_category(MYSQL_TYPES, &normalize_type_name(&name))
    }

    fn describe_sql(&self) -> &'static str {
        "SELECT CAST(COLUMN_NAME AS CHAR) AS column_name, CAST(COLUMN_TYPE AS CHAR) AS column_type
         FROM INFORMATION_SCHEMA.COLUMNS
         WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ?
         ORDER BY ORDINAL_POSITION"
    }

    fn push_contains(&self, predicate: &mut Predicate, column: &str, pattern: String) {
        // LIKE follows the column collation; LOWER on both sides makes it case-insensitive everywhere.
        predicate
            .push("LOWER(")
            .push(column)
            .push(") LIKE LOWER(")
            .push_bind(pattern)
            .push(")");
    }

    fn push_regex(&self, predicate: &mut Predicate, column: &str, pattern: String) {
        predicate.push(column).push(" REGEXP ").push_bind(pattern);
    }

    fn select_as_text(&self, column: &str) -> String {
        format!("CAST({} AS CHAR)", column)
    }
}
