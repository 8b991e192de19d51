//! The DataTables query service.
//!
//! This module drives one request through the pipeline:
//! 1.  Introspect the table (optionally cached) through the `DatabaseAdapter`.
//! 2.  Compile filters, ordering and paging into a `QueryPlan`.
//! 3.  Execute the page and both counts, then format the rows for the client.

use crate::dialect::Dialect;
use crate::domain::compile::{assemble, QueryPlan};
use crate::domain::diagnostics::Diagnostics;
use crate::domain::format::format_rows;
use crate::domain::model::column::duplicate_exposed;
use crate::domain::model::{QueryOutcome, QueryRequest, QueryResponse};
use crate::domain::schema::SchemaColumnType;
use crate::error::{EngineError, EngineResult};
use crate::storage::{DatabaseAdapter, SchemaCache};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceOptions {
    pub schema_cache: bool,
    /// Deadline applied separately to introspection and to page execution.
    pub timeout: Option<Duration>,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            schema_cache: true,
            timeout: Some(Duration::from_secs(30)),
        }
    }
}

/// Runs paginated table-view requests against one database.
pub struct DataTableService {
    adapter: Arc<dyn DatabaseAdapter>,
    cache: Option<SchemaCache>,
    timeout: Option<Duration>,
}

impl DataTableService {
    pub fn new(adapter: Arc<dyn DatabaseAdapter>, options: ServiceOptions) -> Self {
        Self {
            adapter,
            cache: options.schema_cache.then(SchemaCache::new),
            timeout: options.timeout,
        }
    }

    pub fn dialect(&self) -> &'static dyn Dialect {
        self.adapter.dialect()
    }

    pub fn adapter(&self) -> &Arc<dyn DatabaseAdapter> {
        &self.adapter
    }

    pub fn cache(&self) -> Option<&SchemaCache> {
        self.cache.as_ref()
    }

    /// Column types of `table`, served from the cache when enabled.
    #[tracing::instrument(skip(self), fields(dialect = self.dialect().name()))]
    pub async fn describe(&self, table: &str) -> EngineResult<Arc<Vec<SchemaColumnType>>> {
        let dialect = self.dialect().name();
        if let Some(cache) = &self.cache {
            if let Some(schema) = cache.get(dialect, table).await {
                return Ok(schema);
            }
        }

        let columns = self
            .with_deadline(table, self.adapter.describe(table))
            .await?
            .map_err(EngineError::from)?;
        tracing::debug!(columns = columns.len(), "introspected table");

        match &self.cache {
            Some(cache) => Ok(cache.insert(dialect, table, columns).await),
            None => Ok(Arc::new(columns)),
        }
    }

    /// Compiles `request` against an already known schema. Touches no database.
    pub fn compile(
        &self,
        request: &QueryRequest,
        schema: &[SchemaColumnType],
    ) -> EngineResult<(QueryPlan, Diagnostics)> {
        validate(request)?;
        let mut diagnostics = Diagnostics::new();
        let plan = assemble(self.dialect(), request, schema, &mut diagnostics)?;
        Ok((plan, diagnostics))
    }

    /// Full pipeline: introspect, compile, execute, format.
    #[tracing::instrument(
        skip(self, request),
        fields(table = %request.table, dialect = self.dialect().name())
    )]
    pub async fn process(&self, request: QueryRequest) -> EngineResult<QueryOutcome> {
        validate(&request)?;
        let schema = self.describe(&request.table).await?;
        let (plan, diagnostics) = self.compile(&request, &schema)?;
        tracing::debug!(sql = %plan.data.sql, "data statement");
        tracing::debug!(sql = %plan.filtered_count.sql, "filtered count statement");
        tracing::debug!(sql = %plan.total_count.sql, "total count statement");

        let page = self
            .with_deadline(&request.table, self.adapter.fetch_page(&plan))
            .await?
            .map_err(EngineError::from)?;

        let data = format_rows(&page.rows, &request.columns);
        tracing::info!(
            rows = data.len(),
            filtered = page.filtered,
            total = page.total,
            diagnostics = diagnostics.len(),
            "served page"
        );

        Ok(QueryOutcome {
            response: QueryResponse {
                draw: request.draw,
                records_total: page.total,
                // Concurrent writes between the two counts cannot break filtered <= total.
                records_filtered: page.filtered.min(page.total),
                data,
            },
            diagnostics,
        })
    }

    async fn with_deadline<F, T>(&self, table: &str, fut: F) -> EngineResult<T>
    where
        F: Future<Output = T>,
    {
        match self.timeout {
            None => Ok(fut.await),
            Some(after) => tokio::time::timeout(after, fut).await.map_err(|_| {
                tracing::warn!(table, ?after, "query deadline elapsed");
                EngineError::Timeout {
                    dialect: self.dialect().name(),
                    table: table.to_string(),
                    after,
                }
            }),
        }
    }
}

fn validate(request: &QueryRequest) -> EngineResult<()> {
    if request.table.trim().is_empty() {
        return Err(EngineError::InvalidRequest("table name must not be empty".to_string()));
    }
    if request.columns.is_empty() {
        return Err(EngineError::InvalidRequest(
            "at least one column descriptor is required".to_string(),
        ));
    }
    if let Some(dup) = duplicate_exposed(&request.columns) {
        return Err(EngineError::InvalidRequest(format!(
            "exposed name '{}' is used by more than one column",
            dup
        )));
    }
    Ok(())
}
