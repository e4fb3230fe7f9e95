use async_trait::async_trait;

use crate::error::RowsyncResult;
use crate::types::ChangeRecord;

/// A downstream consumer of enriched change records.
///
/// Handlers are registered with the processor as an ordered collection and invoked
/// sequentially for every record. A failing handler only loses its own copy of the
/// record: the failure is logged under [`name`] and delivery to the remaining
/// handlers continues. There are no retries and no rollback.
///
/// [`name`]: Handler::name
#[async_trait]
pub trait Handler: Send + Sync {
    /// Delivers one change record to the sink.
    async fn deliver(&self, record: &ChangeRecord) -> RowsyncResult<()>;

    /// Short name identifying this handler in logs.
    fn name(&self) -> &str;
}
