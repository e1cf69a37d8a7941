//! Storage error types.

use thiserror::Error;

/// Result type for cache storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid cache entry: {0}")]
    InvalidEntry(String),

    #[error("unknown cache collection: {0}")]
    UnknownCollection(String),
}

impl From<trickipedia_types::ParseCollectionError> for StorageError {
    fn from(e: trickipedia_types::ParseCollectionError) -> Self {
        StorageError::UnknownCollection(e.0)
    }
}
