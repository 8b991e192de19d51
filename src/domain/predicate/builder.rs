//! Type-dispatched predicate construction for a single column and search term.

use crate::dialect::Dialect;
use crate::domain::predicate::{Predicate, SqlValue};
use crate::domain::schema::TypeCategory;
use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// The column a search term is applied to.
#[derive(Debug, Clone, Copy)]
pub struct PredicateTarget<'a> {
    /// Physical column name, escaped by the dialect before use.
    pub source: &'a str,
    pub category: TypeCategory,
}

/// Why no predicate was produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    EmptyTerm,
    /// The term is not a valid value of the column's category.
    Unparsable,
    /// The category never produces predicates.
    UnsupportedCategory,
}

/// Builds the predicate for `term` on `target`.
///
/// | category | predicate |
/// |---|---|
/// | Text + regex | dialect regex operator |
/// | Text | dialect case-insensitive contains, wildcards escaped |
/// | Integer / Float | equality, skipped when the term does not parse |
/// | Boolean | equality against `true`/`false`/`1`/`0`, skipped otherwise |
/// | Date / DateTime | equality against the parsed value, skipped otherwise |
/// | Unknown | never |
pub fn build_predicate(
    dialect: &dyn Dialect,
    target: PredicateTarget<'_>,
    term: &str,
    regex: bool,
) -> Result<Predicate, SkipReason> {
    if term.is_empty() {
        return Err(SkipReason::EmptyTerm);
    }
    let column = dialect.escape_identifier(target.source);
    let mut predicate = Predicate::new();

    match target.category {
        TypeCategory::Text if regex => {
            regex::Regex::new(term).map_err(|_| SkipReason::Unparsable)?;
            dialect.push_regex(&mut predicate, &column, term.to_string());
        }
        TypeCategory::Text => {
            dialect.push_contains(&mut predicate, &column, format!("%{}%", escape_like(term)));
        }
        TypeCategory::Integer => {
            let value = term.trim().parse::<i64>().map_err(|_| SkipReason::Unparsable)?;
            push_equals(&mut predicate, &column, value);
        }
        TypeCategory::Float => {
            let value = term
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or(SkipReason::Unparsable)?;
            push_equals(&mut predicate, &column, value);
        }
        TypeCategory::Boolean => {
            let value = parse_bool(term).ok_or(SkipReason::Unparsable)?;
            push_equals(&mut predicate, &column, value);
        }
        TypeCategory::Date => {
            let value = parse_date(term).ok_or(SkipReason::Unparsable)?;
            push_equals(&mut predicate, &column, value);
        }
        TypeCategory::DateTime => {
            let value = parse_datetime(term).ok_or(SkipReason::Unparsable)?;
            push_equals(&mut predicate, &column, value);
        }
        TypeCategory::Unknown => return Err(SkipReason::UnsupportedCategory),
    }

    Ok(predicate)
}

fn push_equals(predicate: &mut Predicate, column: &str, value: impl Into<SqlValue>) {
    predicate.push(column).push(" = ").push_bind(value);
}

/// Escapes `LIKE` wildcards so the term matches literally (backslash is the default escape
/// character in both supported dialects).
pub fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

pub fn parse_bool(term: &str) -> Option<bool> {
    match term.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

pub fn parse_date(term: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(term.trim(), "%Y-%m-%d").ok()
}

/// RFC 3339 (converted to UTC), `YYYY-MM-DD[ T]HH:MM:SS[.f]`, or a bare date at midnight.
pub fn parse_datetime(term: &str) -> Option<NaiveDateTime> {
    let term = term.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(term) {
        return Some(dt.naive_utc());
    }
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(term, format) {
            return Some(dt);
        }
    }
    parse_date(term).and_then(|d| d.and_hms_opt(0, 0, 0))
}
