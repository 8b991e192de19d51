use crate::dialect::{lookup_category, normalize_type_name, Dialect};
use crate::domain::predicate::Predicate;
use crate::domain::schema::TypeCategory;

/// `udt_name` values (and their `data_type` spellings) as reported by `information_schema.columns`.
pub const POSTGRES_TYPES: &[(&str, TypeCategory)] = &[
    ("text", TypeCategory::Text),
    ("varchar", TypeCategory::Text),
    ("character varying", TypeCategory::Text),
    ("bpchar", TypeCategory::Text),
    ("char", TypeCategory::Text),
    ("character", TypeCategory::Text),
    ("name", TypeCategory::Text),
    ("citext", TypeCategory::Text),
    ("string", TypeCategory::Text),
    ("int2", TypeCategory::Integer),
    ("int4", TypeCategory::Integer),
    ("int8", TypeCategory::Integer),
    ("int", TypeCategory::Integer),
    ("smallint", TypeCategory::Integer),
    ("integer", TypeCategory::Integer),
    ("bigint", TypeCategory::Integer),
    ("smallserial", TypeCategory::Integer),
    ("serial", TypeCategory::Integer),
    ("bigserial", TypeCategory::Integer),
    ("float4", TypeCategory::Float),
    ("float8", TypeCategory::Float),
    ("real", TypeCategory::Float),
    ("double precision", TypeCategory::Float),
    ("numeric", TypeCategory::Float),
    ("decimal", TypeCategory::Float),
    ("bool", TypeCategory::Boolean),
    ("boolean", TypeCategory::Boolean),
    ("date", TypeCategory::Date),
    ("timestamp", TypeCategory::DateTime),
    ("timestamptz", TypeCategory::DateTime),
    ("timestamp without time zone", TypeCategory::DateTime),
    ("timestamp with time zone", TypeCategory::DateTime),
];

/// PostgreSQL family: double-quoted identifiers, `$n` placeholders.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresDialect;

impl Dialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn escape_identifier(&self, name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    fn placeholder(&self, index: usize) -> String {
        format!("${}", index)
    }

    fn type_category(&self, raw_type: &str) -> TypeCategory {
        lookup_category(POSTGRES_TYPES, &normalize_type_name(raw_type))
    }

    fn describe_sql(&self) -> &'static str {
        "SELECT column_name::text AS column_name, udt_name::text AS column_type
         FROM information_schema.columns
         WHERE table_schema = current_schema() AND table_name = $1
         ORDER BY ordinal_position"
    }

    fn push_contains(&self, predicate: &mut Predicate, column: &str, pattern: String) {
        predicate.push(column).push(" ILIKE ").push_bind(pattern);
    }

    fn push_regex(&self, predicate: &mut Predicate, column: &str, pattern: String) {
        predicate.push(column).push(" ~* ").push_bind(pattern);
    }

    fn select_as_text(&self, column: &str) -> String {
        format!("{}::text", column)
    }
}
