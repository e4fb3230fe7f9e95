use std::future::Future;

use crate::error::RowsyncResult;
use crate::types::TableName;

/// A source of table column metadata.
///
/// The schema cache calls this exactly once per table, on the first miss; afterwards
/// the cached schema is reused for the process lifetime. A failing lookup surfaces as
/// [`crate::error::ErrorKind::MetadataUnavailable`] and fails only the event that
/// triggered it.
pub trait MetadataProvider {
    /// Returns the table's column names in physical column order.
    fn column_names(&self, table: &TableName)
        -> impl Future<Output = RowsyncResult<Vec<String>>> + Send;
}
