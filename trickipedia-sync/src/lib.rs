//! Offline catalog sync for Trickipedia.
//!
//! Keeps a local replica of the trick and category catalog fresh enough for
//! offline browsing:
//! - Bulk catalog reads from the hosted backend
//! - A connectivity flag fed by platform online/offline notifications
//! - A 24 h refresh gate recorded in the cache's metadata
//! - An optional background worker that retries when connectivity returns

pub mod catalog_client;
pub mod config;
pub mod connectivity;
pub mod error;
pub mod offline_sync;
pub mod types;
pub mod worker;

pub use catalog_client::{CatalogApiClient, CatalogSource};
pub use config::SyncConfig;
pub use connectivity::Connectivity;
pub use error::{SyncError, SyncResult};
pub use offline_sync::OfflineSync;
pub use types::*;
pub use worker::{OfflineSyncHandle, OfflineSyncWorker, create_offline_sync_worker};
