pub mod app;
pub mod dialect;
pub mod domain;
pub mod error;
pub mod infra;
pub mod storage;
pub mod transport;

// Convenience re-exports (keeps call-sites clean)
pub use app::{DataTableService, ServiceOptions};
pub use dialect::{Dialect, DialectKind, MySqlDialect, PostgresDialect};
pub use domain::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
pub use domain::model::{
    BaseConditions, ColumnDescriptor, ColumnFilter, ComparisonOp, Condition, Direction,
    FilterRequest, OrderKey, PageRequest, QueryOutcome, QueryRequest, QueryResponse,
};
pub use domain::schema::{SchemaColumnType, TypeCategory};
pub use error::{ConfigError, EngineError, EngineResult, ExecutionError, SchemaError};
pub use infra::views::{TableView, ViewRegistry};
pub use storage::{DatabaseAdapter, MySqlAdapter, PostgresAdapter, SchemaCache};
