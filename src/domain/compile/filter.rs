//! Per-column and global search compilation.

use crate::dialect::Dialect;
use crate::domain::diagnostics::{DiagnosticKind, Diagnostics};
use crate::domain::model::column::{resolve, ColumnDescriptor};
use crate::domain::model::FilterRequest;
use crate::domain::predicate::{build_predicate, Predicate, PredicateTarget, SkipReason};
use crate::domain::schema::SchemaColumnType;

/// The two independently compiled halves of the WHERE clause.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledFilter {
    /// Per-column predicates joined with AND.
    pub individual: Option<Predicate>,
    /// Global term across searchable columns joined with OR.
    pub global: Option<Predicate>,
}

impl CompiledFilter {
    /// `(individual) AND (global)`, omitting an empty side.
    pub fn into_predicate(self) -> Option<Predicate> {
        Predicate::conjunction(self.individual.into_iter().chain(self.global).collect())
    }
}

pub fn compile_filter(
    dialect: &dyn Dialect,
    columns: &[ColumnDescriptor],
    schema: &[SchemaColumnType],
    filter: &FilterRequest,
    diagnostics: &mut Diagnostics,
) -> CompiledFilter {
    CompiledFilter {
        individual: compile_individual(dialect, columns, schema, filter, diagnostics),
        global: compile_global(dialect, columns, schema, filter, diagnostics),
    }
}

fn compile_individual(
    dialect: &dyn Dialect,
    columns: &[ColumnDescriptor],
    schema: &[SchemaColumnType],
    filter: &FilterRequest,
    diagnostics: &mut Diagnostics,
) -> Option<Predicate> {
    let mut predicates = Vec::new();

    for column_filter in filter.per_column.iter().filter(|f| !f.term.is_empty()) {
        let Some(descriptor) = resolve(columns, &column_filter.exposed) else {
            diagnostics.push(&column_filter.exposed, DiagnosticKind::UnknownColumn);
            continue;
        };
        if !column_filter.searchable || !descriptor.searchable {
            diagnostics.push(&descriptor.exposed, DiagnosticKind::NotSearchable);
            continue;
        }
        let Some(schema_column) = schema.iter().find(|c| c.source == descriptor.source) else {
            diagnostics.push(&descriptor.source, DiagnosticKind::MissingSchemaColumn);
            continue;
        };

        let target = PredicateTarget {
            source: &descriptor.source,
            category: schema_column.category,
        };
        match build_predicate(dialect, target, &column_filter.term, column_filter.regex) {
            Ok(predicate) => predicates.push(predicate),
            Err(SkipReason::EmptyTerm) => {}
            Err(SkipReason::Unparsable) => diagnostics.push(
                &descriptor.exposed,
                DiagnosticKind::ValueParseSkip {
                    category: schema_column.category.to_string(),
                    term: column_filter.term.clone(),
                },
            ),
            Err(SkipReason::UnsupportedCategory) => diagnostics.push(
                &descriptor.exposed,
                DiagnosticKind::UnsupportedCategory {
                    raw_type: schema_column.raw_type.clone(),
                },
            ),
        }
    }

    Predicate::all(predicates)
}

fn compile_global(
    dialect: &dyn Dialect,
    columns: &[ColumnDescriptor],
    schema: &[SchemaColumnType],
    filter: &FilterRequest,
    diagnostics: &mut Diagnostics,
) -> Option<Predicate> {
    let global = filter.global.as_ref().filter(|g| !g.term.is_empty())?;
    let mut predicates = Vec::new();

    let searchable = columns
        .iter()
        .filter(|c| c.searchable && filter.client_allows_search(&c.exposed));
    for descriptor in searchable {
        // Missing schema columns are reported once by the assembler.
        let Some(schema_column) = schema.iter().find(|c| c.source == descriptor.source) else {
            continue;
        };
        let target = PredicateTarget {
            source: &descriptor.source,
            category: schema_column.category,
        };
        match build_predicate(dialect, target, &global.term, global.regex) {
            Ok(predicate) => predicates.push(predicate),
            Err(SkipReason::Unparsable) => diagnostics.push(
                &descriptor.exposed,
                DiagnosticKind::ValueParseSkip {
                    category: schema_column.category.to_string(),
                    term: global.term.clone(),
                },
            ),
            Err(SkipReason::EmptyTerm) | Err(SkipReason::UnsupportedCategory) => {}
        }
    }

    Predicate::any(predicates)
}
