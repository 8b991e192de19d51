use crate::dialect::Dialect;
use crate::domain::diagnostics::{DiagnosticKind, Diagnostics};
use crate::domain::model::column::{resolve, ColumnDescriptor};
use crate::domain::model::OrderRequest;
use crate::domain::schema::SchemaColumnType;

/// Builds the ORDER BY items (`"users"."col" ASC`) in request order.
///
/// Items are qualified with the table so they bind to the stored column and not to the
/// text-cast output alias of the same name. Unknown, non-sortable and schema-less columns
/// are skipped and diagnosed.
pub fn compile_order(
    dialect: &dyn Dialect,
    table: &str,
    columns: &[ColumnDescriptor],
    schema: &[SchemaColumnType],
    order: &OrderRequest,
    diagnostics: &mut Diagnostics,
) -> Vec<String> {
    let mut items = Vec::with_capacity(order.len());
    let qualifier = dialect.escape_identifier(table);

    for key in order {
        let Some(descriptor) = resolve(columns, &key.exposed) else {
            diagnostics.push(&key.exposed, DiagnosticKind::UnknownColumn);
            continue;
        };
        if !descriptor.sortable {
            diagnostics.push(&descriptor.exposed, DiagnosticKind::NotSortable);
            continue;
        }
        if !schema.iter().any(|c| c.source == descriptor.source) {
            diagnostics.push(&descriptor.source, DiagnosticKind::MissingSchemaColumn);
            continue;
        }
        items.push(format!(
            "{}.{} {}",
            qualifier,
            dialect.escape_identifier(&descriptor.source),
            key.direction.as_sql()
        ));
    }

    items
}
