//! DuckDB storage layer for the Trickipedia offline cache.
//!
//! Mirrors a subset of the server catalog locally so tricks and categories
//! can be browsed without a connection.
//!
//! # Architecture
//!
//! - Every collection lives in one `cache_entries` table keyed by
//!   `(collection, id)`, with the record stored as a JSON snapshot
//! - Category and subcategory slugs are extracted into index columns at write
//!   time so filtered reads never parse JSON
//! - Sync metadata is an ordinary record in the `metadata` collection

mod cache_store;
mod error;
mod schema;

pub use cache_store::CacheStore;
pub use error::{StorageError, StorageResult};

use tracing::warn;

/// Open a DuckDB connection with stale WAL recovery and resource limits.
///
/// If the initial open fails and a `.wal` file exists alongside the database,
/// it is removed and the open is retried once. An unclean shutdown of the
/// host shell commonly leaves such a file behind.
pub fn open_duckdb_with_wal_recovery(
    path: &std::path::Path,
    memory_limit: &str,
    threads: u32,
) -> StorageResult<duckdb::Connection> {
    let conn = match duckdb::Connection::open(path) {
        Ok(c) => c,
        Err(first_err) => {
            let wal_path = path.with_extension(
                path.extension()
                    .map(|ext| format!("{}.wal", ext.to_string_lossy()))
                    .unwrap_or_else(|| "wal".to_string()),
            );
            if wal_path.exists() {
                warn!(
                    "cache open failed, removing stale WAL and retrying: {}",
                    wal_path.display()
                );
                if std::fs::remove_file(&wal_path).is_ok() {
                    let c = duckdb::Connection::open(path)?;
                    apply_resource_limits(&c, memory_limit, threads)?;
                    return Ok(c);
                }
            }
            return Err(first_err.into());
        }
    };
    apply_resource_limits(&conn, memory_limit, threads)?;
    Ok(conn)
}

fn apply_resource_limits(
    conn: &duckdb::Connection,
    memory_limit: &str,
    threads: u32,
) -> StorageResult<()> {
    conn.execute_batch(&format!(
        "PRAGMA memory_limit='{}'; PRAGMA threads={};",
        memory_limit, threads
    ))?;
    Ok(())
}
