use mysql_async::prelude::Queryable;
use mysql_async::Pool;

use crate::error::{ErrorKind, RowsyncResult};
use crate::metadata::base::MetadataProvider;
use crate::{bail, rowsync_error};
use crate::types::TableName;

/// Query returning a table's column names in physical column order.
const COLUMN_NAMES_QUERY: &str = "SELECT column_name FROM information_schema.columns \
     WHERE table_schema = ? AND table_name = ? ORDER BY ordinal_position";

/// A [`MetadataProvider`] resolving column names from `information_schema`.
///
/// Connections come from a shared [`Pool`], so the provider is cheap to clone and a
/// lookup never interferes with the binlog connection.
#[derive(Debug, Clone)]
pub struct MySqlMetadataProvider {
    pool: Pool,
}

impl MySqlMetadataProvider {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

impl MetadataProvider for MySqlMetadataProvider {
    async fn column_names(&self, table: &TableName) -> RowsyncResult<Vec<String>> {
        let mut conn = self.pool.get_conn().await.map_err(|err| {
            rowsync_error!(
                ErrorKind::MetadataUnavailable,
                "Failed to acquire a metadata connection",
                err
            )
        })?;

        let column_names: Vec<String> = conn
            .exec(
                COLUMN_NAMES_QUERY,
                (table.schema.as_str(), table.name.as_str()),
            )
            .await
            .map_err(|err| {
                rowsync_error!(
                    ErrorKind::MetadataUnavailable,
                    "Column metadata query failed",
                    err
                )
            })?;

        if column_names.is_empty() {
            bail!(
                ErrorKind::MetadataUnavailable,
                "Table has no columns in information_schema",
                table
            );
        }

        Ok(column_names)
    }
}
