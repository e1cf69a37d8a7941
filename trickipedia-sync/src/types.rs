//! Shared types for offline sync.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Counts written by one successful full sync.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub tricks: usize,
    pub categories: usize,
    pub subcategories: usize,
    pub synced_at: DateTime<Utc>,
}

/// What a gated sync attempt did. Failures are logged, not returned.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SyncOutcome {
    /// Offline, or the cache is still inside the sync interval.
    Skipped,
    Synced(SyncReport),
    /// Nothing was recorded; the next eligible call retries.
    Failed { error: String },
}

impl SyncOutcome {
    pub fn is_synced(&self) -> bool {
        matches!(self, SyncOutcome::Synced(_))
    }
}

/// Commands accepted by the background sync worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncCommand {
    /// Run a gated sync attempt now.
    SyncNow,
    Stop,
}
