//! Request/response model of a paginated table view.

pub mod column;
pub mod request;
pub mod response;

pub use column::{ColumnDescriptor, Row, Transform};
pub use request::{
    BaseConditions, ColumnFilter, ComparisonOp, Condition, Direction, Draw, FilterRequest,
    GlobalSearch, OrderKey, OrderRequest, PageRequest, QueryRequest,
};
pub use response::{QueryOutcome, QueryResponse, Record};
