//! Offline cache store. Keeps server snapshots as JSON with extracted slug columns.

use crate::error::{StorageError, StorageResult};
use crate::schema::initialize_cache_schema;
use chrono::{DateTime, Utc};
use duckdb::{Connection, params};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};
use trickipedia_types::{
    CacheCollection, CacheEntry, CacheFilter, LAST_SYNC_KEY, UserProgressRecord,
};

/// Local key-value cache backed by DuckDB.
///
/// Cloning is cheap; clones share the same connection.
#[derive(Clone)]
pub struct CacheStore {
    conn: Arc<Mutex<Connection>>,
}

/// A record ready to be written: key and index columns already extracted.
struct PreparedRow {
    id: String,
    data_json: String,
    category_slug: Option<String>,
    subcategory_slug: Option<String>,
}

impl CacheStore {
    /// Opens or creates a cache at the given path.
    pub fn open(path: &Path) -> StorageResult<Self> {
        let conn = crate::open_duckdb_with_wal_recovery(path, "128MB", 1)?;
        initialize_cache_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Opens an in-memory cache (for testing and `:memory:` hosts).
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_cache_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Acquire the connection lock, recovering from poison left by a
    /// panicking writer.
    fn lock_conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|poisoned| {
            warn!("recovering from poisoned cache connection mutex");
            poisoned.into_inner()
        })
    }

    // ── Entries ──

    /// Upserts a batch of records into a collection in one transaction.
    ///
    /// Each record is keyed by the collection's key field. A record without a
    /// usable key fails the whole batch. Duplicate keys collapse to the last
    /// occurrence. Returns the number of distinct records written.
    pub fn put_entries(
        &self,
        collection: CacheCollection,
        records: &[serde_json::Value],
    ) -> StorageResult<usize> {
        let mut rows: Vec<PreparedRow> = Vec::with_capacity(records.len());
        let mut positions: HashMap<String, usize> = HashMap::with_capacity(records.len());
        for record in records {
            let row = prepare_row(collection, record)?;
            match positions.get(&row.id) {
                Some(&pos) => rows[pos] = row,
                None => {
                    positions.insert(row.id.clone(), rows.len());
                    rows.push(row);
                }
            }
        }

        let now = Utc::now().timestamp_millis();
        let mut conn = self.lock_conn();
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT OR REPLACE INTO cache_entries (
                    collection, id, data_json, category_slug, subcategory_slug, cached_at
                ) VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )?;
            for row in &rows {
                stmt.execute(params![
                    collection.as_str(),
                    row.id,
                    row.data_json,
                    row.category_slug.as_deref(),
                    row.subcategory_slug.as_deref(),
                    now,
                ])?;
            }
        }
        tx.commit()?;

        debug!("cached {} {} entries", rows.len(), collection);
        Ok(rows.len())
    }

    /// Upserts a single record, returning the key it was stored under.
    pub fn put_entry(
        &self,
        collection: CacheCollection,
        record: &serde_json::Value,
    ) -> StorageResult<String> {
        let row = prepare_row(collection, record)?;
        let conn = self.lock_conn();
        conn.execute(
            r#"
            INSERT OR REPLACE INTO cache_entries (
                collection, id, data_json, category_slug, subcategory_slug, cached_at
            ) VALUES (?, ?, ?, ?, ?, ?)
            "#,
            params![
                collection.as_str(),
                row.id,
                row.data_json,
                row.category_slug.as_deref(),
                row.subcategory_slug.as_deref(),
                Utc::now().timestamp_millis(),
            ],
        )?;
        Ok(row.id)
    }

    /// Gets a single entry by key.
    pub fn get_entry(
        &self,
        collection: CacheCollection,
        id: &str,
    ) -> StorageResult<Option<CacheEntry>> {
        let conn = self.lock_conn();
        let result = conn.query_row(
            "SELECT data_json FROM cache_entries WHERE collection = ? AND id = ?",
            params![collection.as_str(), id],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(data_json) => Ok(Some(CacheEntry {
                id: id.to_string(),
                collection,
                data: serde_json::from_str(&data_json)?,
            })),
            Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Reads every entry of a collection ordered by key, optionally narrowed
    /// by a slug index column.
    ///
    /// Collections without the requested index column yield no entries.
    pub fn read_cached(
        &self,
        collection: CacheCollection,
        filter: Option<&CacheFilter>,
    ) -> StorageResult<Vec<CacheEntry>> {
        let conn = self.lock_conn();

        let mut sql = String::from("SELECT id, data_json FROM cache_entries WHERE collection = ?");
        match filter {
            Some(CacheFilter::CategorySlug(_)) => sql.push_str(" AND category_slug = ?"),
            Some(CacheFilter::SubcategorySlug(_)) => sql.push_str(" AND subcategory_slug = ?"),
            None => {}
        }
        sql.push_str(" ORDER BY id");

        let mut stmt = conn.prepare(&sql)?;
        let map_row = |row: &duckdb::Row<'_>| -> duckdb::Result<(String, String)> {
            Ok((row.get(0)?, row.get(1)?))
        };
        let rows: Vec<(String, String)> = match filter {
            Some(f) => stmt
                .query_map(params![collection.as_str(), f.slug()], map_row)?
                .collect::<Result<_, _>>()?,
            None => stmt
                .query_map(params![collection.as_str()], map_row)?
                .collect::<Result<_, _>>()?,
        };

        drop(stmt);
        drop(conn);

        let mut entries = Vec::with_capacity(rows.len());
        for (id, data_json) in rows {
            match serde_json::from_str(&data_json) {
                Ok(data) => entries.push(CacheEntry { id, collection, data }),
                Err(e) => warn!("skipping unreadable {collection} entry {id}: {e}"),
            }
        }
        Ok(entries)
    }

    /// Counts the entries in a collection.
    pub fn count(&self, collection: CacheCollection) -> StorageResult<usize> {
        let conn = self.lock_conn();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM cache_entries WHERE collection = ?",
            params![collection.as_str()],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Removes every entry of a collection.
    pub fn clear_collection(&self, collection: CacheCollection) -> StorageResult<()> {
        let conn = self.lock_conn();
        conn.execute(
            "DELETE FROM cache_entries WHERE collection = ?",
            params![collection.as_str()],
        )?;
        Ok(())
    }

    // ── Metadata ──

    /// Stores `value` under `key` in the metadata collection.
    pub fn set_metadata(&self, key: &str, value: serde_json::Value) -> StorageResult<()> {
        self.put_entry(
            CacheCollection::Metadata,
            &serde_json::json!({ "key": key, "value": value }),
        )?;
        Ok(())
    }

    pub fn get_metadata(&self, key: &str) -> StorageResult<Option<serde_json::Value>> {
        Ok(self
            .get_entry(CacheCollection::Metadata, key)?
            .and_then(|entry| entry.data.get("value").cloned()))
    }

    /// Time of the last successful full sync, if any.
    pub fn last_sync_at(&self) -> StorageResult<Option<DateTime<Utc>>> {
        let Some(value) = self.get_metadata(LAST_SYNC_KEY)? else {
            return Ok(None);
        };
        let millis = value.as_i64().ok_or_else(|| {
            StorageError::InvalidEntry(format!(
                "{LAST_SYNC_KEY} is not an epoch timestamp: {value}"
            ))
        })?;
        Ok(DateTime::from_timestamp_millis(millis))
    }

    /// Records a successful full sync at `at`.
    pub fn record_sync(&self, at: DateTime<Utc>) -> StorageResult<()> {
        self.set_metadata(LAST_SYNC_KEY, serde_json::json!(at.timestamp_millis()))
    }

    // ── User progress ──

    pub fn put_user_progress(&self, progress: &UserProgressRecord) -> StorageResult<()> {
        self.put_entry(CacheCollection::UserProgress, &serde_json::to_value(progress)?)?;
        Ok(())
    }

    pub fn get_user_progress(&self, user_id: &str) -> StorageResult<Option<UserProgressRecord>> {
        match self.get_entry(CacheCollection::UserProgress, user_id)? {
            Some(entry) => Ok(Some(entry.decode()?)),
            None => Ok(None),
        }
    }

    /// Checkpoints the database so the WAL is folded back into the main file.
    pub fn run_maintenance(&self) -> StorageResult<()> {
        let conn = self.lock_conn();
        conn.execute_batch("CHECKPOINT")?;
        Ok(())
    }
}

fn prepare_row(
    collection: CacheCollection,
    record: &serde_json::Value,
) -> StorageResult<PreparedRow> {
    let id = record
        .pointer(collection.key_path())
        .and_then(CacheEntry::key_from_value)
        .ok_or_else(|| {
            StorageError::InvalidEntry(format!(
                "{collection} record has no usable key at {}",
                collection.key_path()
            ))
        })?;

    Ok(PreparedRow {
        id,
        data_json: serde_json::to_string(record)?,
        category_slug: extract_slug(record, collection.category_slug_path()),
        subcategory_slug: extract_slug(record, collection.subcategory_slug_path()),
    })
}

fn extract_slug(record: &serde_json::Value, path: Option<&str>) -> Option<String> {
    path.and_then(|p| record.pointer(p))
        .and_then(|v| v.as_str())
        .map(str::to_string)
}
