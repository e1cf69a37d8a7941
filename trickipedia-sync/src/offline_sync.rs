//! Timestamp-gated catalog refresh.
//!
//! A full sync fetches tricks and categories concurrently, overwrites the
//! cached copies by identifier, and only then records the sync time. Any
//! failure leaves the previous timestamp in place so the next eligible call
//! retries immediately.

use crate::catalog_client::CatalogSource;
use crate::config::SyncConfig;
use crate::connectivity::Connectivity;
use crate::error::{SyncError, SyncResult};
use crate::types::{SyncOutcome, SyncReport};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};
use trickipedia_storage::{CacheStore, StorageResult};
use trickipedia_types::{CacheCollection, CacheEntry, CacheFilter};

/// Offline cache sync over an explicitly opened store.
///
/// Concurrent `sync` calls are not coalesced: each runs to completion and the
/// last writer wins. Every write is a full snapshot, so the result is the
/// same either way.
pub struct OfflineSync {
    store: CacheStore,
    source: Arc<dyn CatalogSource>,
    connectivity: Connectivity,
    sync_interval: chrono::Duration,
}

impl OfflineSync {
    pub fn new(
        store: CacheStore,
        source: Arc<dyn CatalogSource>,
        connectivity: Connectivity,
        config: &SyncConfig,
    ) -> Self {
        let sync_interval =
            chrono::Duration::from_std(config.sync_interval()).unwrap_or(chrono::Duration::MAX);
        Self {
            store,
            source,
            connectivity,
            sync_interval,
        }
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    pub fn connectivity(&self) -> &Connectivity {
        &self.connectivity
    }

    /// True when online and the last full sync is missing or at least one
    /// sync interval old.
    pub fn should_sync(&self) -> bool {
        if !self.connectivity.is_online() {
            return false;
        }
        self.is_due(self.store.last_sync_at().map_err(SyncError::from))
    }

    /// `should_sync` with the metadata read moved off the async executor.
    async fn should_sync_blocking(&self) -> bool {
        if !self.connectivity.is_online() {
            return false;
        }
        let store = self.store.clone();
        self.is_due(run_blocking(move || store.last_sync_at()).await)
    }

    fn is_due(&self, last_sync: SyncResult<Option<DateTime<Utc>>>) -> bool {
        match last_sync {
            Ok(None) => true,
            Ok(Some(last)) => Utc::now() - last >= self.sync_interval,
            Err(e) => {
                warn!("could not read last sync time, treating cache as unsynced: {e}");
                true
            }
        }
    }

    /// Runs a full sync if `should_sync` allows it. Never fails; errors are
    /// logged and reported as `SyncOutcome::Failed`.
    pub async fn sync(&self) -> SyncOutcome {
        if !self.should_sync_blocking().await {
            debug!("offline sync skipped");
            return SyncOutcome::Skipped;
        }

        match self.force_sync().await {
            Ok(report) => SyncOutcome::Synced(report),
            Err(e) => {
                warn!("offline sync failed, keeping stale cache: {e}");
                SyncOutcome::Failed {
                    error: e.to_string(),
                }
            }
        }
    }

    /// Runs a full sync regardless of the gate, returning any error.
    pub async fn force_sync(&self) -> SyncResult<SyncReport> {
        let (tricks, categories) =
            tokio::try_join!(self.source.fetch_tricks(), self.source.fetch_categories())?;
        let subcategories = flatten_subcategories(&categories);

        let report_tricks = self.write(CacheCollection::Tricks, tricks).await?;
        let report_categories = self.write(CacheCollection::Categories, categories).await?;
        let report_subcategories = self.write(CacheCollection::Subcategories, subcategories).await?;

        let synced_at = Utc::now();
        let store = self.store.clone();
        run_blocking(move || store.record_sync(synced_at)).await?;

        info!(
            "offline cache synced: {report_tricks} tricks, {report_categories} categories, \
             {report_subcategories} subcategories"
        );
        Ok(SyncReport {
            tricks: report_tricks,
            categories: report_categories,
            subcategories: report_subcategories,
            synced_at,
        })
    }

    /// Reads cached entries without touching the network.
    pub fn read_cached(
        &self,
        collection: CacheCollection,
        filter: Option<&CacheFilter>,
    ) -> SyncResult<Vec<CacheEntry>> {
        Ok(self.store.read_cached(collection, filter)?)
    }

    pub fn last_sync_at(&self) -> SyncResult<Option<DateTime<Utc>>> {
        Ok(self.store.last_sync_at()?)
    }

    async fn write(
        &self,
        collection: CacheCollection,
        records: Vec<serde_json::Value>,
    ) -> SyncResult<usize> {
        let store = self.store.clone();
        run_blocking(move || store.put_entries(collection, &records)).await
    }
}

/// Runs a DuckDB call on the blocking pool.
async fn run_blocking<T, F>(f: F) -> SyncResult<T>
where
    F: FnOnce() -> StorageResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| SyncError::Task(e.to_string()))?
        .map_err(SyncError::from)
}

/// Pulls nested subcategories out of category snapshots, tagging each with
/// its parent so it can be filtered by category slug.
fn flatten_subcategories(categories: &[serde_json::Value]) -> Vec<serde_json::Value> {
    let mut out = Vec::new();
    for category in categories {
        let Some(subs) = category.get("subcategories").and_then(|v| v.as_array()) else {
            continue;
        };

        let mut parent = serde_json::Map::new();
        for field in ["id", "name", "slug"] {
            if let Some(v) = category.get(field) {
                parent.insert(field.to_string(), v.clone());
            }
        }

        for sub in subs {
            let Some(obj) = sub.as_object() else { continue };
            let mut obj = obj.clone();
            obj.insert(
                "master_category".to_string(),
                serde_json::Value::Object(parent.clone()),
            );
            out.push(serde_json::Value::Object(obj));
        }
    }
    out
}
