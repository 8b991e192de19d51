use serde_json::{Map, Value as JsonValue};
use std::fmt;
use std::sync::Arc;

/// A decoded database row keyed by physical column name.
pub type Row = Map<String, JsonValue>;

/// Optional per-column value transform. Receives the raw cell value and the whole row.
pub type Transform = Arc<dyn Fn(&JsonValue, &Row) -> JsonValue + Send + Sync>;

/// Caller-owned mapping between a physical column and a response field.
#[derive(Clone)]
pub struct ColumnDescriptor {
    /// Physical column name.
    pub source: String,
    /// Response field name. Unique within one request.
    pub exposed: String,
    pub sortable: bool,
    pub searchable: bool,
    pub transform: Option<Transform>,
}

impl ColumnDescriptor {
    /// Searchable and sortable column exposed under its own name.
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        Self {
            exposed: source.clone(),
            source,
            sortable: true,
            searchable: true,
            transform: None,
        }
    }

    pub fn exposed_as(mut self, exposed: impl Into<String>) -> Self {
        self.exposed = exposed.into();
        self
    }

    pub fn searchable(mut self, searchable: bool) -> Self {
        self.searchable = searchable;
        self
    }

    pub fn sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    pub fn with_transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(&JsonValue, &Row) -> JsonValue + Send + Sync + 'static,
    {
        self.transform = Some(Arc::new(transform));
        self
    }
}

impl fmt::Debug for ColumnDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDescriptor")
            .field("source", &self.source)
            .field("exposed", &self.exposed)
            .field("sortable", &self.sortable)
            .field("searchable", &self.searchable)
            .field("transform", &self.transform.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

/// Resolves an exposed name to exactly one descriptor.
pub fn resolve<'a>(columns: &'a [ColumnDescriptor], exposed: &str) -> Option<&'a ColumnDescriptor> {
    columns.iter().find(|c| c.exposed == exposed)
}

/// Returns the first exposed name used by more than one descriptor.
pub fn duplicate_exposed(columns: &[ColumnDescriptor]) -> Option<&str> {
    columns.iter().enumerate().find_map(|(idx, c)| {
        columns[..idx]
            .iter()
            .any(|earlier| earlier.exposed == c.exposed)
            .then_some(c.exposed.as_str())
    })
}
