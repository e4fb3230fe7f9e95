use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

use crate::error::RowsyncResult;
use crate::handler::base::Handler;
use crate::types::ChangeRecord;

#[derive(Debug)]
struct Inner {
    records: Vec<ChangeRecord>,
}

/// A [`Handler`] that keeps every delivered record in memory.
///
/// Useful for demos and tests; the recorded changes can be inspected afterwards.
/// Cloning shares the record buffer.
#[derive(Debug, Clone)]
pub struct MemoryHandler {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryHandler {
    pub fn new() -> Self {
        let inner = Inner {
            records: Vec::new(),
        };

        Self {
            inner: Arc::new(Mutex::new(inner)),
        }
    }

    /// Returns a copy of every record delivered so far, in delivery order.
    pub async fn records(&self) -> Vec<ChangeRecord> {
        let inner = self.inner.lock().await;
        inner.records.clone()
    }
}

impl Default for MemoryHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Handler for MemoryHandler {
    async fn deliver(&self, record: &ChangeRecord) -> RowsyncResult<()> {
        let mut inner = self.inner.lock().await;
        info!(
            schema = %record.schema,
            table = %record.table,
            action = %record.action,
            "storing change record in memory"
        );
        inner.records.push(record.clone());

        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
