use std::collections::BTreeMap;

use crate::bail;
use crate::error::{ErrorKind, RowsyncResult};
use crate::types::{ChangeRecord, RowMutationEvent, TableSchema};

/// Builds a sink-ready [`ChangeRecord`] from a raw row mutation and its schema.
///
/// Column names are zipped against the event's current row image positionally, so the
/// row width must match the schema's column count exactly. A mismatch means the cached
/// schema is stale (the table was altered upstream after caching) and fails the record
/// instead of misaligning names and values. Null values stay in the mapping as
/// explicit nulls.
pub fn enrich_row(
    event: &RowMutationEvent,
    table_schema: &TableSchema,
) -> RowsyncResult<ChangeRecord> {
    if event.values.len() != table_schema.column_count() {
        bail!(
            ErrorKind::SchemaMismatch,
            "Row width does not match the cached schema",
            format!(
                "table {} carried {} values but the cached schema has {} columns",
                event.table,
                event.values.len(),
                table_schema.column_count()
            )
        );
    }

    let data: BTreeMap<_, _> = table_schema
        .column_names
        .iter()
        .cloned()
        .zip(event.values.iter().cloned())
        .collect();

    Ok(ChangeRecord {
        schema: event.table.schema.clone(),
        table: event.table.name.clone(),
        action: event.action,
        data,
    })
}
