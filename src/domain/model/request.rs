use crate::domain::model::column::ColumnDescriptor;
use crate::domain::predicate::SqlValue;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::str::FromStr;

/// Search term targeting one exposed column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnFilter {
    pub exposed: String,
    /// Empty means "no predicate for this column".
    pub term: String,
    pub regex: bool,
    /// Whether the client allows searching this column. A client-disabled column
    /// never takes part in per-column or global search.
    pub searchable: bool,
}

impl ColumnFilter {
    pub fn new(exposed: impl Into<String>, term: impl Into<String>) -> Self {
        Self {
            exposed: exposed.into(),
            term: term.into(),
            regex: false,
            searchable: true,
        }
    }

    pub fn regex(mut self, regex: bool) -> Self {
        self.regex = regex;
        self
    }

    pub fn searchable(mut self, searchable: bool) -> Self {
        self.searchable = searchable;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GlobalSearch {
    pub term: String,
    pub regex: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterRequest {
    pub per_column: Vec<ColumnFilter>,
    pub global: Option<GlobalSearch>,
}

impl FilterRequest {
    pub fn with_column(mut self, filter: ColumnFilter) -> Self {
        self.per_column.push(filter);
        self
    }

    pub fn with_global(mut self, term: impl Into<String>, regex: bool) -> Self {
        self.global = Some(GlobalSearch {
            term: term.into(),
            regex,
        });
        self
    }

    /// False when the client explicitly disabled searching on `exposed`.
    pub fn client_allows_search(&self, exposed: &str) -> bool {
        self.per_column
            .iter()
            .filter(|f| f.exposed == exposed)
            .all(|f| f.searchable)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(Direction::Asc),
            "desc" => Ok(Direction::Desc),
            _ => Err(s.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderKey {
    pub exposed: String,
    pub direction: Direction,
}

impl OrderKey {
    pub fn new(exposed: impl Into<String>, direction: Direction) -> Self {
        Self {
            exposed: exposed.into(),
            direction,
        }
    }
}

/// Sort keys in priority order.
pub type OrderRequest = Vec<OrderKey>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub offset: u64,
    limit: u64,
}

impl PageRequest {
    /// A zero limit is raised to one.
    pub fn new(offset: u64, limit: u64) -> Self {
        Self {
            offset,
            limit: limit.max(1),
        }
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(0, 10)
    }
}

/// Opaque token echoed back verbatim in the response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Draw(pub JsonValue);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    IsNull,
    IsNotNull,
}

impl ComparisonOp {
    pub fn as_sql(&self) -> &'static str {
        match self {
            ComparisonOp::Eq => "=",
            ComparisonOp::Ne => "<>",
            ComparisonOp::Lt => "<",
            ComparisonOp::Le => "<=",
            ComparisonOp::Gt => ">",
            ComparisonOp::Ge => ">=",
            ComparisonOp::IsNull => "IS NULL",
            ComparisonOp::IsNotNull => "IS NOT NULL",
        }
    }

    pub fn takes_value(&self) -> bool {
        !matches!(self, ComparisonOp::IsNull | ComparisonOp::IsNotNull)
    }
}

/// A caller-defined restriction on a physical column.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub column: String,
    pub op: ComparisonOp,
    pub value: Option<SqlValue>,
}

impl Condition {
    pub fn compare(column: impl Into<String>, op: ComparisonOp, value: impl Into<SqlValue>) -> Self {
        Self {
            column: column.into(),
            op,
            value: Some(value.into()),
        }
    }

    pub fn eq(column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        Self::compare(column, ComparisonOp::Eq, value)
    }

    pub fn is_null(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            op: ComparisonOp::IsNull,
            value: None,
        }
    }

    pub fn is_not_null(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            op: ComparisonOp::IsNotNull,
            value: None,
        }
    }
}

/// Conditions the caller imposes on top of the client's filters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BaseConditions {
    /// Restrict the data page and `recordsFiltered`.
    pub result: Vec<Condition>,
    /// Restrict everything, `recordsTotal` included.
    pub all: Vec<Condition>,
}

impl BaseConditions {
    pub fn is_empty(&self) -> bool {
        self.result.is_empty() && self.all.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct QueryRequest {
    pub table: String,
    pub columns: Vec<ColumnDescriptor>,
    pub filter: FilterRequest,
    pub order: OrderRequest,
    pub page: PageRequest,
    pub draw: Draw,
    pub base: BaseConditions,
}

impl QueryRequest {
    pub fn new(table: impl Into<String>, columns: Vec<ColumnDescriptor>) -> Self {
        Self {
            table: table.into(),
            columns,
            filter: FilterRequest::default(),
            order: Vec::new(),
            page: PageRequest::default(),
            draw: Draw::default(),
            base: BaseConditions::default(),
        }
    }

    pub fn with_filter(mut self, filter: FilterRequest) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_order(mut self, order: OrderRequest) -> Self {
        self.order = order;
        self
    }

    pub fn with_page(mut self, page: PageRequest) -> Self {
        self.page = page;
        self
    }

    pub fn with_draw(mut self, draw: impl Into<JsonValue>) -> Self {
        self.draw = Draw(draw.into());
        self
    }

    pub fn with_base(mut self, base: BaseConditions) -> Self {
        self.base = base;
        self
    }
}
