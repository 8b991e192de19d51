//! Assembles the data page and its two count queries from one compiled WHERE.

use crate::dialect::Dialect;
use crate::domain::compile::filter::compile_filter;
use crate::domain::compile::order::compile_order;
use crate::domain::diagnostics::{DiagnosticKind, Diagnostics};
use crate::domain::model::{Condition, QueryRequest};
use crate::domain::predicate::{Predicate, Statement, StatementBuilder};
use crate::domain::schema::{SchemaColumnType, TypeCategory};
use crate::error::{EngineError, EngineResult};

/// A physical column in the SELECT list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedColumn {
    pub source: String,
    pub category: TypeCategory,
}

/// Everything needed to execute one request.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    pub table: String,
    /// Columns of `data`, in select order.
    pub selected: Vec<SelectedColumn>,
    /// `SELECT ... LIMIT ... OFFSET ...`
    pub data: Statement,
    /// `SELECT COUNT(*)` with the same WHERE as `data`.
    pub filtered_count: Statement,
    /// `SELECT COUNT(*)` restricted only by the caller's `all` conditions.
    pub total_count: Statement,
}

pub fn assemble(
    dialect: &dyn Dialect,
    request: &QueryRequest,
    schema: &[SchemaColumnType],
    diagnostics: &mut Diagnostics,
) -> EngineResult<QueryPlan> {
    let selected = select_list(request, schema, diagnostics);
    if selected.is_empty() {
        return Err(EngineError::InvalidRequest(format!(
            "none of the configured columns exist in table '{}'",
            request.table
        )));
    }

    let filter = compile_filter(dialect, &request.columns, schema, &request.filter, diagnostics);
    let order = compile_order(
        dialect,
        &request.table,
        &request.columns,
        schema,
        &request.order,
        diagnostics,
    );

    let result_scope = condition_group(dialect, &request.base.result)?;
    let all_scope = condition_group(dialect, &request.base.all)?;

    let filtered_where = Predicate::conjunction(
        filter
            .into_predicate()
            .into_iter()
            .chain(result_scope)
            .chain(all_scope.clone())
            .collect(),
    );

    let table = dialect.escape_identifier(&request.table);

    let mut data = StatementBuilder::new(dialect);
    data.push("SELECT ");
    for (idx, column) in selected.iter().enumerate() {
        if idx > 0 {
            data.push(", ");
        }
        let escaped = dialect.escape_identifier(&column.source);
        data.push(&dialect.select_as_text(&escaped))
            .push(" AS ")
            .push(&escaped);
    }
    data.push(" FROM ").push(&table);
    push_where(&mut data, filtered_where.as_ref());
    if !order.is_empty() {
        data.push(" ORDER BY ").push(&order.join(", "));
    }
    data.push(" LIMIT ")
        .push_bind(request.page.limit())
        .push(" OFFSET ")
        .push_bind(request.page.offset);

    Ok(QueryPlan {
        table: request.table.clone(),
        selected,
        data: data.build(),
        filtered_count: count_statement(dialect, &table, filtered_where.as_ref()),
        total_count: count_statement(dialect, &table, all_scope.as_ref()),
    })
}

/// Distinct descriptor sources that exist in the schema, in descriptor order.
fn select_list(
    request: &QueryRequest,
    schema: &[SchemaColumnType],
    diagnostics: &mut Diagnostics,
) -> Vec<SelectedColumn> {
    let mut selected: Vec<SelectedColumn> = Vec::new();
    for descriptor in &request.columns {
        if selected.iter().any(|c| c.source == descriptor.source) {
            continue;
        }
        match schema.iter().find(|c| c.source == descriptor.source) {
            Some(column) => selected.push(SelectedColumn {
                source: column.source.clone(),
                category: column.category,
            }),
            None => diagnostics.push(&descriptor.source, DiagnosticKind::MissingSchemaColumn),
        }
    }
    selected
}

fn count_statement(dialect: &dyn Dialect, table: &str, filter: Option<&Predicate>) -> Statement {
    let mut count = StatementBuilder::new(dialect);
    count.push("SELECT COUNT(*) FROM ").push(table);
    push_where(&mut count, filter);
    count.build()
}

fn push_where(builder: &mut StatementBuilder<'_>, filter: Option<&Predicate>) {
    if let Some(filter) = filter {
        builder.push(" WHERE ").push_predicate(filter);
    }
}

/// Caller conditions joined with AND.
fn condition_group(dialect: &dyn Dialect, conditions: &[Condition]) -> EngineResult<Option<Predicate>> {
    let mut predicates = Vec::with_capacity(conditions.len());
    for condition in conditions {
        let mut predicate = Predicate::new();
        predicate
            .push(dialect.escape_identifier(&condition.column))
            .push(" ")
            .push(condition.op.as_sql());
        if condition.op.takes_value() {
            let value = condition.value.clone().ok_or_else(|| {
                EngineError::InvalidRequest(format!(
                    "condition on '{}' requires a value",
                    condition.column
                ))
            })?;
            predicate.push(" ").push_bind(value);
        }
        predicates.push(predicate);
    }
    Ok(Predicate::all(predicates))
}
