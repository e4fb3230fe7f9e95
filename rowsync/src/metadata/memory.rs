use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::{ErrorKind, RowsyncResult};
use crate::metadata::base::MetadataProvider;
use crate::rowsync_error;
use crate::types::TableName;

#[derive(Debug)]
struct Inner {
    tables: HashMap<TableName, Vec<String>>,
    lookups: u64,
}

/// An in-memory [`MetadataProvider`] backed by a static table map.
///
/// Useful for demos and tests. Every `column_names` call is counted so tests can
/// assert that the schema cache really stops querying after the first miss.
#[derive(Debug, Clone)]
pub struct MemoryMetadataProvider {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryMetadataProvider {
    pub fn new() -> Self {
        let inner = Inner {
            tables: HashMap::new(),
            lookups: 0,
        };

        Self {
            inner: Arc::new(Mutex::new(inner)),
        }
    }

    /// Registers a table and its ordered column names.
    pub async fn add_table(&self, table: TableName, column_names: Vec<String>) {
        let mut inner = self.inner.lock().await;
        inner.tables.insert(table, column_names);
    }

    /// Returns how many lookups have been performed so far.
    pub async fn lookups(&self) -> u64 {
        let inner = self.inner.lock().await;
        inner.lookups
    }
}

impl Default for MemoryMetadataProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataProvider for MemoryMetadataProvider {
    async fn column_names(&self, table: &TableName) -> RowsyncResult<Vec<String>> {
        let mut inner = self.inner.lock().await;
        inner.lookups += 1;

        inner.tables.get(table).cloned().ok_or_else(|| {
            rowsync_error!(
                ErrorKind::MetadataUnavailable,
                "Table is not registered with the metadata provider",
                table
            )
        })
    }
}
