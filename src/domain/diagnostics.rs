//! Per-request diagnostics channel.
//!
//! Misconfigured columns and unparsable search terms never abort a request.
//! They are recorded here, logged through `tracing`, and handed back to the
//! caller next to the response so they can be asserted on.

use serde::Serialize;
use std::fmt;

/// What went wrong with one column's contribution to the query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// The request names a column that no descriptor exposes.
    UnknownColumn,
    /// A search term targets a column that is not searchable.
    NotSearchable,
    /// A sort key targets a column that is not sortable.
    NotSortable,
    /// The descriptor's source column does not exist in the live schema.
    MissingSchemaColumn,
    /// A sort direction other than asc/desc was requested.
    InvalidDirection { value: String },
    /// The term does not parse for the column's category; no predicate is emitted.
    ValueParseSkip { category: String, term: String },
    /// The column's category never produces predicates.
    UnsupportedCategory { raw_type: String },
}

impl DiagnosticKind {
    /// Configuration warnings point at a caller/client mismatch; value skips are routine.
    pub fn is_configuration_warning(&self) -> bool {
        !matches!(self, DiagnosticKind::ValueParseSkip { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Exposed (or, for schema problems, physical) column name.
    pub column: String,
    #[serde(flatten)]
    pub kind: DiagnosticKind,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            DiagnosticKind::UnknownColumn => write!(
                f,
                "column '{}' does not match any exposed name (client `data` must equal the server's exposed name)",
                self.column
            ),
            DiagnosticKind::NotSearchable => write!(
                f,
                "column '{}' received a search term but is not searchable (missing searchable: false on the client?)",
                self.column
            ),
            DiagnosticKind::NotSortable => write!(
                f,
                "column '{}' was requested for ordering but is not sortable (missing orderable: false on the client?)",
                self.column
            ),
            DiagnosticKind::MissingSchemaColumn => write!(
                f,
                "column '{}' is not present in the table schema",
                self.column
            ),
            DiagnosticKind::InvalidDirection { value } => write!(
                f,
                "column '{}' has invalid sort direction '{}'",
                self.column, value
            ),
            DiagnosticKind::ValueParseSkip { category, term } => write!(
                f,
                "term '{}' is not a valid {} value for column '{}'",
                term, category, self.column
            ),
            DiagnosticKind::UnsupportedCategory { raw_type } => write!(
                f,
                "column '{}' has unsupported type '{}' and is never searched",
                self.column, raw_type
            ),
        }
    }
}

/// Collects the diagnostics of a single request.
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, column: impl Into<String>, kind: DiagnosticKind) {
        let diagnostic = Diagnostic {
            column: column.into(),
            kind,
        };
        if self.entries.contains(&diagnostic) {
            return;
        }
        tracing::warn!(
            column = %diagnostic.column,
            kind = ?diagnostic.kind,
            configuration = diagnostic.kind.is_configuration_warning(),
            "{}",
            diagnostic
        );
        self.entries.push(diagnostic);
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    /// True if any entry for `column` matches `pred`.
    pub fn has(&self, column: &str, pred: impl Fn(&DiagnosticKind) -> bool) -> bool {
        self.entries
            .iter()
            .any(|d| d.column == column && pred(&d.kind))
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}
