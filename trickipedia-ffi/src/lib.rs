//! C ABI exports for the Trickipedia installable shell.
//!
//! The shell (WebView wrapper on desktop and mobile) owns one handle for the
//! lifetime of the app:
//! - `trickipedia_init` opens the offline cache and returns the handle
//! - platform online/offline notifications go to `trickipedia_set_online`
//! - sync, cached reads and progress results come back as JSON strings
//! - `trickipedia_shutdown` stops the background worker and frees the handle
//!
//! All functions use C-compatible types and report errors via return codes.

mod cache;
mod progress;

pub use cache::*;
pub use progress::*;

use anyhow::Context;
use std::ffi::{CStr, CString, c_char};
use std::path::Path;
use std::sync::Arc;
use tokio::runtime::Runtime;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use trickipedia_storage::{CacheStore, StorageError};
use trickipedia_sync::{
    CatalogApiClient, Connectivity, OfflineSync, OfflineSyncHandle, SyncConfig, SyncError,
};

/// Error codes returned by FFI functions.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrickipediaError {
    /// Operation succeeded.
    Ok = 0,
    /// Null pointer argument.
    NullPointer = 1,
    /// Invalid UTF-8 string.
    InvalidUtf8 = 2,
    /// JSON serialization error.
    JsonError = 3,
    /// Storage error.
    StorageError = 4,
    /// Catalog sync error.
    SyncError = 5,
    /// Invalid argument.
    InvalidArgument = 6,
    /// Unknown error.
    Unknown = 99,
}

/// Opaque handle to an open offline cache and its sync machinery.
pub struct TrickipediaHandle {
    runtime: Runtime,
    sync: Arc<OfflineSync>,
    config: SyncConfig,
    auto_sync: Option<(OfflineSyncHandle, JoinHandle<()>)>,
}

impl TrickipediaHandle {
    fn open(db_path: &str, config: SyncConfig) -> anyhow::Result<Self> {
        let store = if db_path == ":memory:" {
            CacheStore::open_in_memory()
        } else {
            CacheStore::open(Path::new(db_path))
        }
        .with_context(|| format!("opening offline cache at {db_path}"))?;

        let client = CatalogApiClient::new(config.clone()).context("building catalog client")?;
        let runtime = Runtime::new().context("starting async runtime")?;

        let sync = OfflineSync::new(store, Arc::new(client), Connectivity::default(), &config);
        Ok(Self {
            runtime,
            sync: Arc::new(sync),
            config,
            auto_sync: None,
        })
    }

    fn shutdown(mut self) {
        if let Some((worker, task)) = self.auto_sync.take() {
            self.runtime.block_on(async {
                let _ = worker.stop().await;
                let _ = task.await;
            });
        }
        if let Err(e) = self.sync.store().run_maintenance() {
            warn!("cache checkpoint on shutdown failed: {e}");
        }
        info!("trickipedia handle closed");
    }
}

/// Maps an error chain to the code reported across the ABI.
fn error_code(err: &anyhow::Error) -> TrickipediaError {
    if err.downcast_ref::<StorageError>().is_some() {
        return TrickipediaError::StorageError;
    }
    if let Some(sync_err) = err.downcast_ref::<SyncError>() {
        return sync_error_code(sync_err);
    }
    if err.downcast_ref::<serde_json::Error>().is_some() {
        return TrickipediaError::JsonError;
    }
    TrickipediaError::Unknown
}

pub(crate) fn sync_error_code(err: &SyncError) -> TrickipediaError {
    match err {
        SyncError::Storage(_) => TrickipediaError::StorageError,
        SyncError::Serialization(_) => TrickipediaError::JsonError,
        SyncError::Config(_) => TrickipediaError::InvalidArgument,
        _ => TrickipediaError::SyncError,
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

/// Helper: parse a C string pointer to &str.
pub(crate) unsafe fn parse_cstr<'a>(ptr: *const c_char) -> Result<&'a str, TrickipediaError> {
    if ptr.is_null() {
        return Err(TrickipediaError::NullPointer);
    }
    unsafe { CStr::from_ptr(ptr).to_str().map_err(|_| TrickipediaError::InvalidUtf8) }
}

/// Helper: parse an optional C string pointer; null maps to `None`.
pub(crate) unsafe fn parse_optional_cstr<'a>(
    ptr: *const c_char,
) -> Result<Option<&'a str>, TrickipediaError> {
    if ptr.is_null() {
        return Ok(None);
    }
    unsafe { parse_cstr(ptr).map(Some) }
}

/// Helper: write a JSON-serializable value to an out pointer.
pub(crate) unsafe fn write_json_out(
    out: *mut *mut c_char,
    value: &impl serde::Serialize,
) -> TrickipediaError {
    if out.is_null() {
        return TrickipediaError::NullPointer;
    }
    let json = match serde_json::to_string(value) {
        Ok(json) => json,
        Err(_) => return TrickipediaError::JsonError,
    };
    // serde_json escapes NUL inside strings, so this only fails on a bug.
    match CString::new(json) {
        Ok(c_json) => {
            unsafe { *out = c_json.into_raw() };
            TrickipediaError::Ok
        }
        Err(_) => TrickipediaError::JsonError,
    }
}

/// Helper: borrow the handle behind a pointer.
pub(crate) unsafe fn handle_ref<'a>(
    handle: *const TrickipediaHandle,
) -> Result<&'a TrickipediaHandle, TrickipediaError> {
    unsafe { handle.as_ref().ok_or(TrickipediaError::NullPointer) }
}

// ============================================================================
// Core Functions
// ============================================================================

/// Opens the offline cache and returns a handle through `out_handle`.
///
/// `db_path` is a DuckDB file path, or `:memory:` for a throwaway cache.
/// `config_json` is a JSON-encoded sync configuration; null selects defaults
/// and missing fields take their default values.
///
/// # Safety
/// - `db_path` must be a valid null-terminated UTF-8 string.
/// - `config_json` must be null or a valid null-terminated UTF-8 string.
/// - `out_handle` must be a valid pointer. The handle must be released with
///   `trickipedia_shutdown`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn trickipedia_init(
    db_path: *const c_char,
    config_json: *const c_char,
    out_handle: *mut *mut TrickipediaHandle,
) -> TrickipediaError {
    init_tracing();

    if out_handle.is_null() {
        return TrickipediaError::NullPointer;
    }
    let path = match unsafe { parse_cstr(db_path) } {
        Ok(p) => p,
        Err(e) => return e,
    };
    let config = match unsafe { parse_optional_cstr(config_json) } {
        Ok(Some(json)) => match serde_json::from_str::<SyncConfig>(json) {
            Ok(c) => c,
            Err(e) => {
                warn!("rejecting sync config: {e}");
                return TrickipediaError::JsonError;
            }
        },
        Ok(None) => SyncConfig::default(),
        Err(e) => return e,
    };

    match TrickipediaHandle::open(path, config) {
        Ok(handle) => {
            info!("trickipedia initialized at {path}");
            unsafe { *out_handle = Box::into_raw(Box::new(handle)) };
            TrickipediaError::Ok
        }
        Err(e) => {
            warn!("trickipedia init failed: {e:#}");
            error_code(&e)
        }
    }
}

/// Stops background work and frees the handle.
///
/// # Safety
/// - `handle` must be null or a pointer returned by `trickipedia_init` that has
///   not already been shut down.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn trickipedia_shutdown(handle: *mut TrickipediaHandle) {
    if handle.is_null() {
        return;
    }
    let handle = unsafe { Box::from_raw(handle) };
    handle.shutdown();
}

/// Returns the library version string. The pointer is static; do not free it.
#[unsafe(no_mangle)]
pub extern "C" fn trickipedia_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}

/// Frees a string allocated by this library.
///
/// # Safety
/// - `s` must be a string allocated by this library, or null.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn trickipedia_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}
