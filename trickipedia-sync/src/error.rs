//! Sync error types.

use thiserror::Error;
use trickipedia_storage::StorageError;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("catalog request failed with status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("invalid catalog response: {0}")]
    InvalidResponse(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("cache storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("blocking task failed: {0}")]
    Task(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("sync worker not running")]
    WorkerStopped,
}
