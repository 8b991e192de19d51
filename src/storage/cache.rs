//! Process-wide schema cache keyed by `(dialect, table)`.

use crate::domain::schema::SchemaColumnType;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

type CacheKey = (&'static str, String);

/// Introspected schemas shared by concurrent requests.
///
/// Concurrent misses may both hit the catalog; the first stored result wins and
/// every caller observes an equivalent column list.
#[derive(Default)]
pub struct SchemaCache {
    entries: RwLock<HashMap<CacheKey, Arc<Vec<SchemaColumnType>>>>,
}

impl SchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, dialect: &'static str, table: &str) -> Option<Arc<Vec<SchemaColumnType>>> {
        let entries = self.entries.read().await;
        entries.get(&(dialect, table.to_string())).cloned()
    }

    /// Stores `columns` unless another caller got there first; returns the stored value.
    pub async fn insert(
        &self,
        dialect: &'static str,
        table: &str,
        columns: Vec<SchemaColumnType>,
    ) -> Arc<Vec<SchemaColumnType>> {
        let mut entries = self.entries.write().await;
        entries
            .entry((dialect, table.to_string()))
            .or_insert_with(|| Arc::new(columns))
            .clone()
    }

    /// Drops every cached schema for `table`.
    pub async fn invalidate(&self, table: &str) {
        let mut entries = self.entries.write().await;
        entries.retain(|(_, cached), _| cached != table);
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}
