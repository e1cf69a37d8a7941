//! Connectivity, sync and cached-read exports.
//!
//! Pattern: borrow handle → validate inputs → block_on async call → write JSON to out pointer.

use crate::{
    TrickipediaError, TrickipediaHandle, handle_ref, parse_cstr, parse_optional_cstr,
    sync_error_code, write_json_out,
};
use std::ffi::c_char;
use tracing::{debug, info};
use trickipedia_sync::create_offline_sync_worker;
use trickipedia_types::{CacheCollection, CacheFilter};

/// Records a platform online/offline notification.
///
/// # Safety
/// - `handle` must be a valid handle from `trickipedia_init`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn trickipedia_set_online(
    handle: *const TrickipediaHandle,
    online: bool,
) -> TrickipediaError {
    let handle = match unsafe { handle_ref(handle) } {
        Ok(h) => h,
        Err(e) => return e,
    };
    debug!("connectivity changed: online={online}");
    handle.sync.connectivity().set_online(online);
    TrickipediaError::Ok
}

/// Whether a full sync is due. False for a null handle.
///
/// # Safety
/// - `handle` must be null or a valid handle from `trickipedia_init`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn trickipedia_should_sync(handle: *const TrickipediaHandle) -> bool {
    match unsafe { handle_ref(handle) } {
        Ok(h) => h.sync.should_sync(),
        Err(_) => false,
    }
}

/// Runs a gated sync and writes the outcome as JSON, e.g.
/// `{"status":"synced","tricks":120,...}`, `{"status":"skipped"}` or
/// `{"status":"failed","error":"..."}`.
///
/// A failed sync is still `Ok`: the outcome describes it.
///
/// # Safety
/// - `handle` must be a valid handle from `trickipedia_init`.
/// - `out_json` must be a valid pointer. The result must be freed with
///   `trickipedia_free_string`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn trickipedia_sync(
    handle: *const TrickipediaHandle,
    out_json: *mut *mut c_char,
) -> TrickipediaError {
    let handle = match unsafe { handle_ref(handle) } {
        Ok(h) => h,
        Err(e) => return e,
    };
    let outcome = handle.runtime.block_on(handle.sync.sync());
    unsafe { write_json_out(out_json, &outcome) }
}

/// Runs a sync regardless of the interval gate and writes the report as JSON.
/// Errors are returned as codes instead of being folded into the output.
///
/// # Safety
/// - `handle` must be a valid handle from `trickipedia_init`.
/// - `out_json` must be a valid pointer. The result must be freed with
///   `trickipedia_free_string`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn trickipedia_force_sync(
    handle: *const TrickipediaHandle,
    out_json: *mut *mut c_char,
) -> TrickipediaError {
    let handle = match unsafe { handle_ref(handle) } {
        Ok(h) => h,
        Err(e) => return e,
    };
    match handle.runtime.block_on(handle.sync.force_sync()) {
        Ok(report) => unsafe { write_json_out(out_json, &report) },
        Err(e) => sync_error_code(&e),
    }
}

/// Starts the background worker that syncs on startup, on reconnect and on
/// every check interval. Calling it again while running is a no-op.
///
/// # Safety
/// - `handle` must be a valid handle from `trickipedia_init`, not shared with
///   another thread during this call.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn trickipedia_start_auto_sync(
    handle: *mut TrickipediaHandle,
) -> TrickipediaError {
    let handle = match unsafe { handle.as_mut() } {
        Some(h) => h,
        None => return TrickipediaError::NullPointer,
    };
    if handle.auto_sync.is_some() {
        return TrickipediaError::Ok;
    }

    let (worker_handle, worker) =
        create_offline_sync_worker(handle.sync.clone(), handle.config.check_interval());
    let task = handle.runtime.spawn(worker.run());
    handle.auto_sync = Some((worker_handle, task));
    info!("auto sync started");
    TrickipediaError::Ok
}

/// Reads cached records of a collection as a JSON array.
///
/// `filter_kind` is null for no filter, or `"category"` / `"subcategory"` with
/// the slug in `filter_value`.
///
/// # Safety
/// - `handle` must be a valid handle from `trickipedia_init`.
/// - `collection` must be a valid null-terminated UTF-8 string.
/// - `filter_kind` and `filter_value` must be null or valid null-terminated
///   UTF-8 strings.
/// - `out_json` must be a valid pointer. The result must be freed with
///   `trickipedia_free_string`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn trickipedia_read_cached(
    handle: *const TrickipediaHandle,
    collection: *const c_char,
    filter_kind: *const c_char,
    filter_value: *const c_char,
    out_json: *mut *mut c_char,
) -> TrickipediaError {
    let handle = match unsafe { handle_ref(handle) } {
        Ok(h) => h,
        Err(e) => return e,
    };
    let collection = match unsafe { parse_cstr(collection) } {
        Ok(name) => match name.parse::<CacheCollection>() {
            Ok(c) => c,
            Err(_) => return TrickipediaError::InvalidArgument,
        },
        Err(e) => return e,
    };
    let filter = match unsafe { parse_filter(filter_kind, filter_value) } {
        Ok(f) => f,
        Err(e) => return e,
    };

    match handle.sync.read_cached(collection, filter.as_ref()) {
        Ok(entries) => {
            let records: Vec<_> = entries.into_iter().map(|e| e.data).collect();
            unsafe { write_json_out(out_json, &records) }
        }
        Err(e) => sync_error_code(&e),
    }
}

unsafe fn parse_filter(
    kind: *const c_char,
    value: *const c_char,
) -> Result<Option<CacheFilter>, TrickipediaError> {
    let Some(kind) = (unsafe { parse_optional_cstr(kind) })? else {
        return Ok(None);
    };
    let slug = unsafe { parse_cstr(value) }?.to_string();
    match kind {
        "category" => Ok(Some(CacheFilter::CategorySlug(slug))),
        "subcategory" => Ok(Some(CacheFilter::SubcategorySlug(slug))),
        _ => Err(TrickipediaError::InvalidArgument),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use crate::trickipedia_shutdown;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::ffi::CString;
    use std::ptr;

    fn seed(handle: *mut TrickipediaHandle) {
        let h = unsafe { &*handle };
        h.sync
            .store()
            .put_entries(
                CacheCollection::Tricks,
                &[
                    json!({
                        "id": "t1", "name": "Kickflip", "slug": "kickflip",
                        "subcategory": {"slug": "flip-tricks", "name": "Flip Tricks",
                            "master_category": {"slug": "skateboarding", "name": "Skateboarding"}}
                    }),
                    json!({
                        "id": "t2", "name": "Backflip", "slug": "backflip",
                        "subcategory": {"slug": "flips", "name": "Flips",
                            "master_category": {"slug": "parkour", "name": "Parkour"}}
                    }),
                ],
            )
            .unwrap();
    }

    fn read(
        handle: *mut TrickipediaHandle,
        collection: &str,
        filter: Option<(&str, &str)>,
    ) -> Result<serde_json::Value, TrickipediaError> {
        let collection = CString::new(collection).unwrap();
        let kind = filter.map(|(k, _)| CString::new(k).unwrap());
        let value = filter.map(|(_, v)| CString::new(v).unwrap());
        let mut out = ptr::null_mut();
        let result = unsafe {
            trickipedia_read_cached(
                handle,
                collection.as_ptr(),
                kind.as_ref().map_or(ptr::null(), |k| k.as_ptr()),
                value.as_ref().map_or(ptr::null(), |v| v.as_ptr()),
                &mut out,
            )
        };
        match result {
            TrickipediaError::Ok => Ok(take_json(out)),
            e => Err(e),
        }
    }

    #[test]
    fn offline_sync_is_skipped() {
        let handle = open(None);
        assert_eq!(
            unsafe { trickipedia_set_online(handle, false) },
            TrickipediaError::Ok
        );
        assert!(!unsafe { trickipedia_should_sync(handle) });

        let mut out = ptr::null_mut();
        let result = unsafe { trickipedia_sync(handle, &mut out) };
        assert_eq!(result, TrickipediaError::Ok);
        assert_eq!(take_json(out), json!({"status": "skipped"}));

        unsafe { trickipedia_shutdown(handle) };
    }

    #[test]
    fn unreachable_backend_reports_failure_without_error_code() {
        // Nothing listens on port 9 locally.
        let handle = open(Some(
            r#"{"api_base_url": "http://127.0.0.1:9", "request_timeout_secs": 2}"#,
        ));
        assert!(unsafe { trickipedia_should_sync(handle) });

        let mut out = ptr::null_mut();
        let result = unsafe { trickipedia_sync(handle, &mut out) };
        assert_eq!(result, TrickipediaError::Ok);
        assert_eq!(take_json(out)["status"], "failed");
        assert!(unsafe { trickipedia_should_sync(handle) });

        let mut out = ptr::null_mut();
        let result = unsafe { trickipedia_force_sync(handle, &mut out) };
        assert_eq!(result, TrickipediaError::SyncError);
        assert!(out.is_null());

        unsafe { trickipedia_shutdown(handle) };
    }

    #[test]
    fn null_handle_is_rejected() {
        assert!(!unsafe { trickipedia_should_sync(ptr::null()) });
        assert_eq!(
            unsafe { trickipedia_set_online(ptr::null(), true) },
            TrickipediaError::NullPointer
        );
        assert_eq!(
            unsafe { trickipedia_start_auto_sync(ptr::null_mut()) },
            TrickipediaError::NullPointer
        );
    }

    #[test]
    fn read_cached_filters_by_slug() {
        let handle = open(None);
        seed(handle);

        let all = read(handle, "tricks", None).unwrap();
        assert_eq!(all.as_array().unwrap().len(), 2);

        let skate = read(handle, "tricks", Some(("category", "skateboarding"))).unwrap();
        assert_eq!(skate.as_array().unwrap().len(), 1);
        assert_eq!(skate[0]["slug"], "kickflip");

        let flips = read(handle, "tricks", Some(("subcategory", "flips"))).unwrap();
        assert_eq!(flips[0]["id"], "t2");

        let empty = read(handle, "categories", None).unwrap();
        assert_eq!(empty, json!([]));

        unsafe { trickipedia_shutdown(handle) };
    }

    #[test]
    fn read_cached_rejects_bad_arguments() {
        let handle = open(None);
        assert_eq!(
            read(handle, "videos", None),
            Err(TrickipediaError::InvalidArgument)
        );
        assert_eq!(
            read(handle, "tricks", Some(("difficulty", "3"))),
            Err(TrickipediaError::InvalidArgument)
        );

        let collection = CString::new("tricks").unwrap();
        let kind = CString::new("category").unwrap();
        let mut out = ptr::null_mut();
        let result = unsafe {
            trickipedia_read_cached(
                handle,
                collection.as_ptr(),
                kind.as_ptr(),
                ptr::null(),
                &mut out,
            )
        };
        assert_eq!(result, TrickipediaError::NullPointer);

        unsafe { trickipedia_shutdown(handle) };
    }

    #[test]
    fn auto_sync_start_is_idempotent() {
        let handle = open(None);
        unsafe { trickipedia_set_online(handle, false) };
        assert_eq!(
            unsafe { trickipedia_start_auto_sync(handle) },
            TrickipediaError::Ok
        );
        assert_eq!(
            unsafe { trickipedia_start_auto_sync(handle) },
            TrickipediaError::Ok
        );
        unsafe { trickipedia_shutdown(handle) };
    }
}
