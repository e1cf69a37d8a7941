//! Offline sync configuration.

use crate::error::{SyncError, SyncResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the catalog client and sync gate.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Base URL of the hosted backend (e.g., "https://api.trickipedia.app").
    pub api_base_url: String,

    /// Public API key, sent as the `apikey` header and bearer token.
    pub api_key: Option<String>,

    /// Minimum time between full catalog refreshes (seconds).
    pub sync_interval_secs: u64,

    /// How often the background worker re-checks the sync gate (seconds).
    pub check_interval_secs: u64,

    /// Per-request timeout for catalog fetches (seconds).
    pub request_timeout_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.trickipedia.app".to_string(),
            api_key: None,
            sync_interval_secs: 24 * 60 * 60,
            check_interval_secs: 60 * 60,
            request_timeout_secs: 30,
        }
    }
}

impl SyncConfig {
    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync_interval_secs)
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn validate(&self) -> SyncResult<()> {
        let url = &self.api_base_url;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(SyncError::Config(format!(
                "api_base_url must be an http(s) URL, got {:?}",
                self.api_base_url
            )));
        }
        if self.check_interval_secs == 0 {
            return Err(SyncError::Config("check_interval_secs must be positive".to_string()));
        }
        Ok(())
    }
}
