use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::RowsyncResult;
use crate::metadata::MetadataProvider;
use crate::types::{TableName, TableSchema};

#[derive(Debug)]
struct Inner {
    table_schemas: HashMap<TableName, Arc<TableSchema>>,
}

/// Lazily populated cache of table schemas, keyed by (database, table).
///
/// The first resolution of a table queries the metadata provider; every later one is a
/// pure map lookup. Entries are never evicted: the cache is bounded by the number of
/// distinct tables the stream touches, which is small relative to event volume.
///
/// Cloning shares the underlying cache and the provider.
#[derive(Debug)]
pub struct SchemaCache<M> {
    inner: Arc<Mutex<Inner>>,
    metadata: Arc<M>,
}

impl<M> Clone for SchemaCache<M> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            metadata: Arc::clone(&self.metadata),
        }
    }
}

impl<M> SchemaCache<M>
where
    M: MetadataProvider,
{
    pub fn new(metadata: M) -> Self {
        let inner = Inner {
            table_schemas: HashMap::new(),
        };

        Self {
            inner: Arc::new(Mutex::new(inner)),
            metadata: Arc::new(metadata),
        }
    }

    /// Returns the schema for `table`, querying the metadata provider on a miss.
    ///
    /// The metadata query runs outside the cache lock. If two callers race on the same
    /// miss, both query but only the first insert wins, so the handed-out schema is
    /// consistent either way.
    pub async fn resolve(&self, table: &TableName) -> RowsyncResult<Arc<TableSchema>> {
        {
            let inner = self.inner.lock().await;
            if let Some(table_schema) = inner.table_schemas.get(table) {
                return Ok(Arc::clone(table_schema));
            }
        }

        let column_names = self.metadata.column_names(table).await?;
        let table_schema = Arc::new(TableSchema::new(table.clone(), column_names));

        let mut inner = self.inner.lock().await;
        let entry = inner
            .table_schemas
            .entry(table.clone())
            .or_insert(table_schema);

        Ok(Arc::clone(entry))
    }

    /// Seeds the cache with an already known schema.
    ///
    /// Inserting a table that is already cached is a no-op; the first entry wins.
    pub async fn add_table_schema(&self, table_schema: TableSchema) {
        let mut inner = self.inner.lock().await;
        inner
            .table_schemas
            .entry(table_schema.name.clone())
            .or_insert_with(|| Arc::new(table_schema));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::MemoryMetadataProvider;

    fn orders_table() -> TableName {
        TableName::new("shop", "orders")
    }

    #[tokio::test]
    async fn test_second_resolve_is_a_cache_hit() {
        let metadata = MemoryMetadataProvider::new();
        metadata
            .add_table(orders_table(), vec!["id".into(), "name".into()])
            .await;

        let cache = SchemaCache::new(metadata.clone());

        let first = cache.resolve(&orders_table()).await.unwrap();
        let second = cache.resolve(&orders_table()).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(metadata.lookups().await, 1);
    }

    #[tokio::test]
    async fn test_clones_share_the_cache() {
        let metadata = MemoryMetadataProvider::new();
        metadata
            .add_table(orders_table(), vec!["id".into()])
            .await;

        let cache = SchemaCache::new(metadata.clone());
        let cloned = cache.clone();

        cloned.resolve(&orders_table()).await.unwrap();
        cache.resolve(&orders_table()).await.unwrap();

        // The clone's miss populated the shared map, so the original gets a hit.
        assert_eq!(metadata.lookups().await, 1);
    }

    #[tokio::test]
    async fn test_cloning_does_not_require_a_clonable_provider() {
        struct FixedProvider;

        impl MetadataProvider for FixedProvider {
            async fn column_names(&self, _table: &TableName) -> RowsyncResult<Vec<String>> {
                Ok(vec!["id".into()])
            }
        }

        let cache = SchemaCache::new(FixedProvider);
        let cloned = cache.clone();

        let resolved = cloned.resolve(&orders_table()).await.unwrap();
        assert_eq!(resolved.column_names, vec!["id".to_string()]);
    }

    #[tokio::test]
    async fn test_miss_for_unknown_table() {
        let cache = SchemaCache::new(MemoryMetadataProvider::new());

        let result = cache.resolve(&orders_table()).await;
        assert_eq!(
            result.unwrap_err().kind(),
            crate::error::ErrorKind::MetadataUnavailable
        );
    }

    #[tokio::test]
    async fn test_seeded_schema_skips_the_provider() {
        let metadata = MemoryMetadataProvider::new();
        let cache = SchemaCache::new(metadata.clone());

        cache
            .add_table_schema(TableSchema::new(orders_table(), vec!["id".into()]))
            .await;

        let resolved = cache.resolve(&orders_table()).await.unwrap();
        assert_eq!(resolved.column_names, vec!["id".to_string()]);
        assert_eq!(metadata.lookups().await, 0);
    }

    #[tokio::test]
    async fn test_duplicate_seed_is_a_no_op() {
        let cache = SchemaCache::new(MemoryMetadataProvider::new());

        cache
            .add_table_schema(TableSchema::new(orders_table(), vec!["id".into()]))
            .await;
        cache
            .add_table_schema(TableSchema::new(
                orders_table(),
                vec!["id".into(), "name".into()],
            ))
            .await;

        let resolved = cache.resolve(&orders_table()).await.unwrap();
        assert_eq!(resolved.column_names, vec!["id".to_string()]);
    }
}
