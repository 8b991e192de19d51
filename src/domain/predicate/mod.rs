//! SQL predicates and statements that keep literal values out of the SQL text.
//!
//! A [`Predicate`] is a sequence of SQL text pieces and bind markers. Placeholders
//! are only numbered when the predicate is written into a [`StatementBuilder`], so
//! one predicate can be reused by several statements (data page and count) and
//! stay correct for positional `$n` dialects.

pub mod builder;

pub use builder::{build_predicate, PredicateTarget, SkipReason};

use crate::dialect::Dialect;
use chrono::{NaiveDate, NaiveDateTime};

/// A typed literal carried as a bound parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Int(v)
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        SqlValue::Int(v as i64)
    }
}

impl From<u64> for SqlValue {
    fn from(v: u64) -> Self {
        SqlValue::Int(i64::try_from(v).unwrap_or(i64::MAX))
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::Float(v)
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Bool(v)
    }
}

impl From<NaiveDate> for SqlValue {
    fn from(v: NaiveDate) -> Self {
        SqlValue::Date(v)
    }
}

impl From<NaiveDateTime> for SqlValue {
    fn from(v: NaiveDateTime) -> Self {
        SqlValue::DateTime(v)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Part {
    Sql(String),
    Bind,
}

/// A boolean SQL condition plus the values bound into it, in bind order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicate {
    parts: Vec<Part>,
    values: Vec<SqlValue>,
}

impl Predicate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends raw SQL text. Only identifiers that went through
    /// `Dialect::escape_identifier` and fixed keywords belong here.
    pub fn push(&mut self, sql: impl AsRef<str>) -> &mut Self {
        let sql = sql.as_ref();
        if let Some(Part::Sql(last)) = self.parts.last_mut() {
            last.push_str(sql);
        } else {
            self.parts.push(Part::Sql(sql.to_string()));
        }
        self
    }

    pub fn push_bind(&mut self, value: impl Into<SqlValue>) -> &mut Self {
        self.parts.push(Part::Bind);
        self.values.push(value.into());
        self
    }

    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// `(a AND b AND ...)`, or `None` when there is nothing to join.
    pub fn all(predicates: Vec<Predicate>) -> Option<Predicate> {
        Self::join(predicates, " AND ")
    }

    /// `(a OR b OR ...)`, or `None` when there is nothing to join.
    pub fn any(predicates: Vec<Predicate>) -> Option<Predicate> {
        Self::join(predicates, " OR ")
    }

    /// Joins already-grouped predicates with AND without adding another pair of parentheses.
    pub fn conjunction(predicates: Vec<Predicate>) -> Option<Predicate> {
        let mut predicates = predicates.into_iter().filter(|p| !p.is_empty());
        let mut out = predicates.next()?;
        for p in predicates {
            out.push(" AND ");
            out.append(p);
        }
        Some(out)
    }

    fn join(predicates: Vec<Predicate>, separator: &str) -> Option<Predicate> {
        let predicates: Vec<Predicate> = predicates.into_iter().filter(|p| !p.is_empty()).collect();
        if predicates.is_empty() {
            return None;
        }
        let mut out = Predicate::new();
        out.push("(");
        for (idx, p) in predicates.into_iter().enumerate() {
            if idx > 0 {
                out.push(separator);
            }
            out.append(p);
        }
        out.push(")");
        Some(out)
    }

    fn append(&mut self, other: Predicate) {
        for part in other.parts {
            match part {
                Part::Sql(sql) => {
                    self.push(sql);
                }
                Part::Bind => self.parts.push(Part::Bind),
            }
        }
        self.values.extend(other.values);
    }

    /// Renders the predicate alone, numbering placeholders from 1.
    pub fn render(&self, dialect: &dyn Dialect) -> Statement {
        let mut builder = StatementBuilder::new(dialect);
        builder.push_predicate(self);
        builder.build()
    }
}

/// Final SQL text plus positional values.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub values: Vec<SqlValue>,
}

/// Accumulates SQL text, numbering placeholders with the dialect as values are bound.
pub struct StatementBuilder<'d> {
    dialect: &'d dyn Dialect,
    sql: String,
    values: Vec<SqlValue>,
}

impl<'d> StatementBuilder<'d> {
    pub fn new(dialect: &'d dyn Dialect) -> Self {
        Self {
            dialect,
            sql: String::new(),
            values: Vec::new(),
        }
    }

    pub fn push(&mut self, sql: &str) -> &mut Self {
        self.sql.push_str(sql);
        self
    }

    pub fn push_bind(&mut self, value: impl Into<SqlValue>) -> &mut Self {
        self.values.push(value.into());
        let placeholder = self.dialect.placeholder(self.values.len());
        self.sql.push_str(&placeholder);
        self
    }

    pub fn push_predicate(&mut self, predicate: &Predicate) -> &mut Self {
        let mut values = predicate.values.iter();
        for part in &predicate.parts {
            match part {
                Part::Sql(sql) => self.sql.push_str(sql),
                Part::Bind => {
                    if let Some(v) = values.next() {
                        self.push_bind(v.clone());
                    }
                }
            }
        }
        self
    }

    pub fn build(self) -> Statement {
        Statement {
            sql: self.sql,
            values: self.values,
        }
    }
}
