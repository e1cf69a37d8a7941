use crate::error::StorageResult;
use duckdb::Connection;

/// Creates the cache table if it does not exist yet.
///
/// Only the primary key is indexed. The slug columns are rewritten by every
/// `INSERT OR REPLACE`, so they stay plain columns.
pub(crate) fn initialize_cache_schema(conn: &Connection) -> StorageResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS cache_entries (
            collection VARCHAR NOT NULL,
            id VARCHAR NOT NULL,
            data_json TEXT NOT NULL,
            category_slug VARCHAR,
            subcategory_slug VARCHAR,
            cached_at BIGINT NOT NULL,
            PRIMARY KEY (collection, id)
        );
        "#,
    )?;
    Ok(())
}
