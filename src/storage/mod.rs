//! Database access behind the `DatabaseAdapter` capability.

pub mod cache;
pub mod mysql;
pub mod postgres;

pub use cache::SchemaCache;
pub use mysql::MySqlAdapter;
pub use postgres::PostgresAdapter;

use crate::dialect::{Dialect, DialectKind};
use crate::domain::compile::{QueryPlan, SelectedColumn};
use crate::domain::model::Row;
use crate::domain::predicate::Statement;
use crate::domain::schema::SchemaColumnType;
use crate::error::{ExecutionError, SchemaError};
use crate::infra::config::DatabaseConfig;
use async_trait::async_trait;
use std::sync::Arc;

/// Rows of one page plus both counts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageRows {
    pub rows: Vec<Row>,
    pub filtered: u64,
    pub total: u64,
}

/// Executes compiled statements against one database family.
///
/// Implementors provide the dialect plus catalog and execution access. `fetch_page`
/// has a sequential default; real adapters override it to read all three
/// statements from one transaction.
#[async_trait]
pub trait DatabaseAdapter: Send + Sync {
    fn dialect(&self) -> &'static dyn Dialect;

    /// Cheap connectivity check (`SELECT 1`).
    async fn ping(&self) -> Result<(), sqlx::Error>;

    /// Live column list of `table`, mapped through the dialect's type table.
    async fn describe(&self, table: &str) -> Result<Vec<SchemaColumnType>, SchemaError>;

    /// Runs a data statement; each row holds the `selected` columns keyed by source name.
    async fn fetch_rows(
        &self,
        statement: &Statement,
        selected: &[SelectedColumn],
    ) -> Result<Vec<Row>, sqlx::Error>;

    /// Runs a `SELECT COUNT(*)` statement.
    async fn fetch_count(&self, statement: &Statement) -> Result<u64, sqlx::Error>;

    async fn fetch_page(&self, plan: &QueryPlan) -> Result<PageRows, ExecutionError> {
        let fail = |source| ExecutionError {
            dialect: self.dialect().name(),
            table: plan.table.clone(),
            source,
        };
        let rows = self
            .fetch_rows(&plan.data, &plan.selected)
            .await
            .map_err(fail)?;
        let filtered = self.fetch_count(&plan.filtered_count).await.map_err(fail)?;
        let total = self.fetch_count(&plan.total_count).await.map_err(fail)?;
        Ok(PageRows {
            rows,
            filtered,
            total,
        })
    }
}

/// Opens a pool for the configured dialect.
pub async fn connect(config: &DatabaseConfig) -> Result<Arc<dyn DatabaseAdapter>, sqlx::Error> {
    match config.dialect {
        DialectKind::Postgres => Ok(Arc::new(PostgresAdapter::connect(config).await?)),
        DialectKind::MySql => Ok(Arc::new(MySqlAdapter::connect(config).await?)),
    }
}

/// Builds the schema from catalog `(column_name, column_type)` pairs.
pub(crate) fn schema_from_catalog(
    dialect: &dyn Dialect,
    table: &str,
    pairs: Vec<(String, String)>,
) -> Result<Vec<SchemaColumnType>, SchemaError> {
    if pairs.is_empty() {
        return Err(SchemaError::TableNotFound {
            dialect: dialect.name(),
            table: table.to_string(),
        });
    }
    Ok(pairs
        .into_iter()
        .map(|(name, raw_type)| {
            let category = dialect.type_category(&raw_type);
            SchemaColumnType::new(name, raw_type, category)
        })
        .collect())
}

pub(crate) fn count_to_u64(count: i64) -> u64 {
    u64::try_from(count).unwrap_or(0)
}
