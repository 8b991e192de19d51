//! Shared test support: an in-memory `DatabaseAdapter` that records every
//! statement it is asked to run and answers with canned rows and counts.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Map, Value as JsonValue};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use table_view_sql::domain::compile::SelectedColumn;
use table_view_sql::domain::model::Row;
use table_view_sql::domain::predicate::Statement;
use table_view_sql::{
    DatabaseAdapter, Dialect, MySqlDialect, PostgresDialect, SchemaColumnType, SchemaError,
};

pub struct RecordingAdapter {
    dialect: &'static dyn Dialect,
    tables: HashMap<String, Vec<SchemaColumnType>>,
    rows: Vec<Row>,
    filtered: u64,
    total: u64,
    delay: Option<Duration>,
    fail_execution: bool,
    describe_calls: AtomicUsize,
    statements: Mutex<Vec<Statement>>,
}

impl RecordingAdapter {
    pub fn new(dialect: &'static dyn Dialect) -> Self {
        Self {
            dialect,
            tables: HashMap::new(),
            rows: Vec::new(),
            filtered: 0,
            total: 0,
            delay: None,
            fail_execution: false,
            describe_calls: AtomicUsize::new(0),
            statements: Mutex::new(Vec::new()),
        }
    }

    pub fn postgres() -> Self {
        Self::new(&PostgresDialect)
    }

    pub fn mysql() -> Self {
        Self::new(&MySqlDialect)
    }

    /// Registers `table` with `(name, raw_type)` columns typed through the dialect.
    pub fn with_table(mut self, table: &str, columns: &[(&str, &str)]) -> Self {
        let schema = columns
            .iter()
            .map(|(name, raw)| {
                SchemaColumnType::new(name.to_string(), raw.to_string(), self.dialect.type_category(raw))
            })
            .collect();
        self.tables.insert(table.to_string(), schema);
        self
    }

    pub fn with_rows(mut self, rows: Vec<JsonValue>) -> Self {
        self.rows = rows
            .into_iter()
            .filter_map(|r| r.as_object().cloned())
            .collect();
        self
    }

    /// Answers for count statements with and without a WHERE clause.
    pub fn with_counts(mut self, filtered: u64, total: u64) -> Self {
        self.filtered = filtered;
        self.total = total;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn failing_execution(mut self) -> Self {
        self.fail_execution = true;
        self
    }

    pub fn describe_calls(&self) -> usize {
        self.describe_calls.load(Ordering::SeqCst)
    }

    pub fn statements(&self) -> Vec<Statement> {
        self.statements.lock().unwrap().clone()
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn record(&self, statement: &Statement) {
        self.statements.lock().unwrap().push(statement.clone());
    }
}

#[async_trait]
impl DatabaseAdapter for RecordingAdapter {
    fn dialect(&self) -> &'static dyn Dialect {
        self.dialect
    }

    async fn ping(&self) -> Result<(), sqlx::Error> {
        if self.fail_execution {
            return Err(sqlx::Error::Protocol("connection refused".to_string()));
        }
        Ok(())
    }

    async fn describe(&self, table: &str) -> Result<Vec<SchemaColumnType>, SchemaError> {
        self.describe_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        self.tables
            .get(table)
            .cloned()
            .ok_or_else(|| SchemaError::TableNotFound {
                dialect: self.dialect.name(),
                table: table.to_string(),
            })
    }

    async fn fetch_rows(
        &self,
        statement: &Statement,
        selected: &[SelectedColumn],
    ) -> Result<Vec<Row>, sqlx::Error> {
        self.record(statement);
        self.pause().await;
        if self.fail_execution {
            return Err(sqlx::Error::Protocol("syntax error".to_string()));
        }
        Ok(self
            .rows
            .iter()
            .map(|row| {
                selected
                    .iter()
                    .filter_map(|c| row.get(&c.source).map(|v| (c.source.clone(), v.clone())))
                    .collect::<Map<String, JsonValue>>()
            })
            .collect())
    }

    async fn fetch_count(&self, statement: &Statement) -> Result<u64, sqlx::Error> {
        self.record(statement);
        if self.fail_execution {
            return Err(sqlx::Error::Protocol("syntax error".to_string()));
        }
        if statement.sql.contains(" WHERE ") {
            Ok(self.filtered)
        } else {
            Ok(self.total)
        }
    }
}

/// `users(id int4, name text, active bool)` on Postgres with three rows.
pub fn users_postgres() -> RecordingAdapter {
    RecordingAdapter::postgres()
        .with_table("users", &[("id", "int4"), ("name", "text"), ("active", "bool")])
        .with_rows(vec![
            json!({ "id": 1, "name": "john", "active": true }),
            json!({ "id": 2, "name": "joanna", "active": false }),
        ])
        .with_counts(2, 3)
}

/// Same table on MySQL (`tinyint(1)` booleans).
pub fn users_mysql() -> RecordingAdapter {
    RecordingAdapter::mysql()
        .with_table(
            "users",
            &[("id", "int(11)"), ("name", "varchar(255)"), ("active", "tinyint(1)")],
        )
        .with_rows(vec![json!({ "id": 1, "name": "john", "active": true })])
        .with_counts(1, 3)
}

pub fn shared(adapter: RecordingAdapter) -> Arc<RecordingAdapter> {
    Arc::new(adapter)
}
