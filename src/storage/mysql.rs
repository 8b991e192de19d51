//! MySQL/MariaDB adapter on top of an sqlx `MySqlPool`.

use crate::dialect::{Dialect, MySqlDialect};
use crate::domain::compile::{QueryPlan, SelectedColumn};
use crate::domain::format::cell_to_json;
use crate::domain::model::Row;
use crate::domain::predicate::{SqlValue, Statement};
use crate::domain::schema::SchemaColumnType;
use crate::error::{ExecutionError, SchemaError};
use crate::infra::config::DatabaseConfig;
use crate::storage::{count_to_u64, schema_from_catalog, DatabaseAdapter, PageRows};
use async_trait::async_trait;
use sqlx::mysql::{MySqlArguments, MySqlConnectOptions, MySqlPoolOptions};
use sqlx::query::Query;
use sqlx::{Executor, MySql, MySqlPool, Row as _};

#[derive(Clone)]
pub struct MySqlAdapter {
    pool: MySqlPool,
}

impl MySqlAdapter {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub async fn connect(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let pool_options = MySqlPoolOptions::new().max_connections(config.max_connections);
        let pool = match &config.url {
            Some(url) => pool_options.connect(url).await?,
            None => {
                let options = MySqlConnectOptions::new()
                    .host(&config.host)
                    .port(config.port)
                    .username(&config.user)
                    .password(&config.password)
                    .database(&config.database);
                pool_options.connect_with(options).await?
            }
        };
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }
}

fn bind_values<'q>(
    mut query: Query<'q, MySql, MySqlArguments>,
    values: &'q [SqlValue],
) -> Query<'q, MySql, MySqlArguments> {
    for value in values {
        query = match value {
            SqlValue::Text(v) => query.bind(v.as_str()),
            SqlValue::Int(v) => query.bind(*v),
            SqlValue::Float(v) => query.bind(*v),
            SqlValue::Bool(v) => query.bind(*v),
            SqlValue::Date(v) => query.bind(*v),
            SqlValue::DateTime(v) => query.bind(*v),
        };
    }
    query
}

async fn fetch_rows_with<'c, E>(
    executor: E,
    statement: &Statement,
    selected: &[SelectedColumn],
) -> Result<Vec<Row>, sqlx::Error>
where
    E: Executor<'c, Database = MySql>,
{
    let rows = bind_values(sqlx::query(&statement.sql), &statement.values)
        .fetch_all(executor)
        .await?;

    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let mut decoded = Row::new();
        for (idx, column) in selected.iter().enumerate() {
            let text: Option<String> = row.try_get(idx)?;
            decoded.insert(column.source.clone(), cell_to_json(text, column.category));
        }
        out.push(decoded);
    }
    Ok(out)
}

async fn fetch_count_with<'c, E>(executor: E, statement: &Statement) -> Result<u64, sqlx::Error>
where
    E: Executor<'c, Database = MySql>,
{
    let row = bind_values(sqlx::query(&statement.sql), &statement.values)
        .fetch_one(executor)
        .await?;
    let count: i64 = row.try_get(0)?;
    Ok(count_to_u64(count))
}

#[async_trait]
impl DatabaseAdapter for MySqlAdapter {
    fn dialect(&self) -> &'static dyn Dialect {
        &MySqlDialect
    }

    async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn describe(&self, table: &str) -> Result<Vec<SchemaColumnType>, SchemaError> {
        let dialect = self.dialect();
        let catalog = |source| SchemaError::Catalog {
            dialect: dialect.name(),
            table: table.to_string(),
            source,
        };

        let rows = sqlx::query(dialect.describe_sql())
            .bind(table)
            .fetch_all(&self.pool)
            .await
            .map_err(catalog)?;

        let mut pairs = Vec::with_capacity(rows.len());
        for row in rows {
            let name: String = row.try_get("column_name").map_err(catalog)?;
            let raw_type: String = row.try_get("column_type").map_err(catalog)?;
            pairs.push((name, raw_type));
        }
        schema_from_catalog(dialect, table, pairs)
    }

    async fn fetch_rows(
        &self,
        statement: &Statement,
        selected: &[SelectedColumn],
    ) -> Result<Vec<Row>, sqlx::Error> {
        fetch_rows_with(&self.pool, statement, selected).await
    }

    async fn fetch_count(&self, statement: &Statement) -> Result<u64, sqlx::Error> {
        fetch_count_with(&self.pool, statement).await
    }

    /// Data page and both counts inside one transaction (InnoDB snapshot from the first read).
    async fn fetch_page(&self, plan: &QueryPlan) -> Result<PageRows, ExecutionError> {
        let fail = |source| ExecutionError {
            dialect: self.dialect().name(),
            table: plan.table.clone(),
            source,
        };

        let mut tx = self.pool.begin().await.map_err(fail)?;

        let rows = fetch_rows_with(&mut *tx, &plan.data, &plan.selected)
            .await
            .map_err(fail)?;
        let filtered = fetch_count_with(&mut *tx, &plan.filtered_count)
            .await
            .map_err(fail)?;
        let total = fetch_count_with(&mut *tx, &plan.total_count)
            .await
            .map_err(fail)?;

        tx.commit().await.map_err(fail)?;

        Ok(PageRows {
            rows,
            filtered,
            total,
        })
    }
}
