//! C-compatible Foreign Function Interface (FFI) for osrm-bridge
//!
//! This module exposes a loaded OSRM engine to C, C++, Python (via ctypes)
//! and any other language that can call a C library.
//!
//! # Handles
//!
//! `osrm_create` returns an opaque `OsrmInstance*`. The pointer value is a
//! token into an internal registry and is never dereferenced, so passing a
//! destroyed handle to a query yields `{1, "OSRM instance not found"}`
//! instead of undefined behaviour. Each handle must be passed to
//! `osrm_destroy` exactly once.
//!
//! # Memory Management
//!
//! - String parameters are null-terminated C strings (`char*`)
//! - `OsrmResult::message` is allocated by Rust and must be released with
//!   `osrm_free_string()`, on success and on failure alike
//! - Coordinates are interleaved `[lon0, lat0, lon1, lat1, ...]`; counts are
//!   numbers of coordinate pairs
//!
//! # Error Handling
//!
//! Queries return an `OsrmResult`:
//! - `code == 0`: `message` holds the engine JSON payload
//! - `code == 1`: `message` holds a human-readable error
//!
//! `osrm_create` returns NULL on failure; the reason is available from
//! `osrm_last_error_message()` on the same thread.
//!
//! # Threading Model
//!
//! Every call is synchronous. A handle may be queried concurrently from
//! several threads. Destroying a handle while another thread is querying it
//! is safe: the engine is freed once the in-flight query returns.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
#[cfg(unix)]
use std::ffi::OsStr;
use std::os::raw::{c_char, c_int};
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::ptr;
use std::sync::Arc;

use log::{error, info, warn};

use crate::core::registry::{self, HandleId};
use crate::core::{
    Algorithm, EngineConfig, Error, NativeEngine, OsrmEngine, Point, Result, RouteRequest,
    RoutingEngine, TableRequest, TripRequest,
};

/// Status code of a successful query
pub const OSRM_OK: c_int = 0;
/// Status code of a failed query
pub const OSRM_ERROR: c_int = 1;

thread_local! {
    static LAST_ERROR: RefCell<Option<String>> = const { RefCell::new(None) };
}

fn set_last_error(msg: String) {
    LAST_ERROR.with(|cell| {
        *cell.borrow_mut() = Some(msg);
    });
}

fn clear_last_error() {
    LAST_ERROR.with(|cell| {
        *cell.borrow_mut() = None;
    });
}

/// Opaque engine handle. Never dereferenced on either side.
#[repr(C)]
pub struct OsrmInstance {
    _private: [u8; 0],
}

/// Outcome of a query
#[repr(C)]
#[derive(Debug)]
pub struct OsrmResult {
    /// 0 on success, 1 on failure
    pub code: c_int,
    /// Payload or error text, to be released with `osrm_free_string()`
    pub message: *mut c_char,
}

impl OsrmResult {
    fn success(payload: String) -> Self {
        Self {
            code: OSRM_OK,
            message: into_c_string(payload),
        }
    }

    fn failure(message: String) -> Self {
        Self {
            code: OSRM_ERROR,
            message: into_c_string(message),
        }
    }

    fn from_outcome(outcome: Result<String>) -> Self {
        match outcome {
            Ok(payload) => Self::success(payload),
            Err(e) => Self::failure(e.caller_message()),
        }
    }
}

/// Hand ownership of `s` to the C caller.
///
/// Interior NUL bytes would truncate the message on the C side; they are
/// stripped.
fn into_c_string(s: String) -> *mut c_char {
    let bytes = if s.contains('\0') { s.replace('\0', "") } else { s };
    CString::new(bytes).unwrap_or_default().into_raw()
}

fn handle_from_id(id: HandleId) -> *mut OsrmInstance {
    id.get() as usize as *mut OsrmInstance
}

fn id_from_handle(instance: *const OsrmInstance) -> Option<HandleId> {
    HandleId::from_raw(instance as usize as u64)
}

fn lookup(instance: *const OsrmInstance) -> Result<Arc<dyn RoutingEngine>> {
    id_from_handle(instance)
        .and_then(registry::lookup)
        .ok_or(Error::InstanceNotFound)
}

/// Register an engine built on the Rust side and return a C handle for it.
///
/// Used by hosts that construct their own [`RoutingEngine`] and hand it to C
/// code. The handle must be released with [`osrm_destroy`].
pub fn register_engine(engine: &OsrmEngine) -> *mut OsrmInstance {
    let id = registry::register(engine.backend());
    info!("Registered OSRM instance #{}", id.get());
    handle_from_id(id)
}

/// Borrow a caller-owned array. A zero count never touches `ptr`.
///
/// # Safety
///
/// When `len > 0` and `ptr` is non-null, `ptr` must point to `len`
/// initialized values that stay alive for `'a`.
unsafe fn caller_slice<'a, T>(ptr: *const T, len: usize, name: &str) -> Result<&'a [T]> {
    if len == 0 {
        return Ok(&[]);
    }
    if ptr.is_null() {
        return Err(Error::InvalidArgument(format!("{name} pointer is NULL")));
    }
    Ok(std::slice::from_raw_parts(ptr, len))
}

/// # Safety
///
/// Same contract as [`caller_slice`], with `num_coordinates` pairs.
unsafe fn caller_points(coordinates: *const f64, num_coordinates: usize) -> Result<Vec<Point>> {
    let len = num_coordinates
        .checked_mul(2)
        .ok_or_else(|| Error::InvalidArgument("coordinate count overflows".to_string()))?;
    let flat = caller_slice(coordinates, len, "coordinates")?;
    crate::core::point::from_interleaved(flat)
}

/// Run a query body, turning panics into an error result.
fn guarded_query(name: &str, body: impl FnOnce() -> Result<String>) -> OsrmResult {
    match panic::catch_unwind(AssertUnwindSafe(body)) {
        Ok(outcome) => OsrmResult::from_outcome(outcome),
        Err(_) => {
            error!("internal panic in {name}");
            OsrmResult::failure(format!("internal panic in {name}"))
        }
    }
}

/// Get the reason the most recent `osrm_create` on this thread failed.
///
/// Returns a string that must be freed with `osrm_free_string()`, or NULL if
/// the last create on this thread succeeded (or none was attempted).
///
/// # Example (C)
/// ```c
/// OsrmInstance* osrm = osrm_create("monaco.osrm", "MLD");
/// if (osrm == NULL) {
///     char* msg = osrm_last_error_message();
///     if (msg) {
///         fprintf(stderr, "Error: %s\n", msg);
///         osrm_free_string(msg);
///     }
/// }
/// ```
#[no_mangle]
pub extern "C" fn osrm_last_error_message() -> *mut c_char {
    LAST_ERROR.with(|cell| match cell.borrow().as_ref() {
        Some(msg) => into_c_string(msg.clone()),
        None => ptr::null_mut(),
    })
}

/// Load an OSRM dataset.
///
/// # Parameters
/// - `storage_path`: base path of the preprocessed dataset (e.g. `monaco.osrm`)
/// - `algorithm`: "CH" or "MLD"; anything else (including NULL) selects MLD
///
/// # Returns
/// A handle to release with `osrm_destroy()`, or NULL on failure.
///
/// The failure reason is kept for `osrm_last_error_message()` and logged at
/// error level. The log record only reaches stderr once the host has called
/// `osrm_logging_init()` (or `osrm_logging_init_env()`); with
/// `osrm_set_log_callback()` it goes to the callback instead.
///
/// # Safety
///
/// - `storage_path` must be a valid, null-terminated C string or NULL (returns NULL).
///   On Unix any byte sequence is accepted.
/// - `algorithm` must be a valid, null-terminated C string or NULL.
#[no_mangle]
pub unsafe extern "C" fn osrm_create(
    storage_path: *const c_char,
    algorithm: *const c_char,
) -> *mut OsrmInstance {
    let result = panic::catch_unwind(|| {
        match unsafe { create_engine(storage_path, algorithm) } {
            Ok(id) => {
                clear_last_error();
                handle_from_id(id)
            }
            Err(e) => {
                error!("{e}");
                set_last_error(e.to_string());
                ptr::null_mut()
            }
        }
    });

    result.unwrap_or_else(|_| {
        error!("internal panic in osrm_create");
        set_last_error("internal panic in osrm_create".to_string());
        ptr::null_mut()
    })
}

unsafe fn create_engine(storage_path: *const c_char, algorithm: *const c_char) -> Result<HandleId> {
    if storage_path.is_null() {
        return Err(Error::InvalidPath("storage_path is NULL".to_string()));
    }
    let path = storage_path_from_c(CStr::from_ptr(storage_path))?;

    let selector = if algorithm.is_null() {
        String::new()
    } else {
        CStr::from_ptr(algorithm).to_string_lossy().into_owned()
    };
    let algorithm = Algorithm::from_selector_lenient(&selector);

    let engine = NativeEngine::open(&EngineConfig::new(&path, algorithm))?;
    let id = registry::register(Arc::new(engine));
    info!(
        "Created OSRM instance #{} from {} ({algorithm})",
        id.get(),
        path.display()
    );
    Ok(id)
}

/// Unix paths are arbitrary bytes and are taken as-is.
#[cfg(unix)]
fn storage_path_from_c(raw: &CStr) -> Result<PathBuf> {
    use std::os::unix::ffi::OsStrExt;
    Ok(PathBuf::from(OsStr::from_bytes(raw.to_bytes())))
}

#[cfg(not(unix))]
fn storage_path_from_c(raw: &CStr) -> Result<PathBuf> {
    raw.to_str()
        .map(PathBuf::from)
        .map_err(|_| Error::InvalidPath("storage_path is not valid UTF-8".to_string()))
}

/// Release an engine.
///
/// NULL is ignored. An unknown or already destroyed handle is logged and
/// otherwise ignored.
///
/// # Safety
///
/// `instance` must be NULL or a value returned by `osrm_create()`.
#[no_mangle]
pub unsafe extern "C" fn osrm_destroy(instance: *mut OsrmInstance) {
    if instance.is_null() {
        return;
    }

    let result = panic::catch_unwind(|| match id_from_handle(instance) {
        Some(id) if registry::release(id) => {
            info!("Destroyed OSRM instance #{}", id.get());
        }
        _ => warn!("osrm_destroy: unknown or already destroyed handle {instance:p}"),
    });

    if result.is_err() {
        error!("internal panic in osrm_destroy");
    }
}

/// Distance/duration matrix.
///
/// With `num_sources == 0` every coordinate is a source; likewise for
/// destinations. Zero of both computes the all-pairs matrix.
///
/// # Safety
///
/// - `coordinates` must point to `2 * num_coordinates` doubles (or be NULL when the count is 0).
/// - `sources` must point to `num_sources` indices (or be NULL when the count is 0).
/// - `destinations` must point to `num_destinations` indices (or be NULL when the count is 0).
#[no_mangle]
pub unsafe extern "C" fn osrm_table(
    instance: *mut OsrmInstance,
    coordinates: *const f64,
    num_coordinates: usize,
    sources: *const usize,
    num_sources: usize,
    destinations: *const usize,
    num_destinations: usize,
) -> OsrmResult {
    guarded_query("osrm_table", || {
        let engine = lookup(instance)?;
        let request = TableRequest {
            coordinates: unsafe { caller_points(coordinates, num_coordinates)? },
            sources: unsafe { caller_slice(sources, num_sources, "sources")? }.to_vec(),
            destinations: unsafe { caller_slice(destinations, num_destinations, "destinations")? }
                .to_vec(),
        };
        OsrmEngine::from_backend(engine).table_json(&request)
    })
}

/// Fastest route through the coordinates, in order.
///
/// # Safety
///
/// `coordinates` must point to `2 * num_coordinates` doubles (or be NULL when the count is 0).
#[no_mangle]
pub unsafe extern "C" fn osrm_route(
    instance: *mut OsrmInstance,
    coordinates: *const f64,
    num_coordinates: usize,
) -> OsrmResult {
    guarded_query("osrm_route", || {
        let engine = lookup(instance)?;
        let request = RouteRequest::new(unsafe { caller_points(coordinates, num_coordinates)? });
        OsrmEngine::from_backend(engine).route_json(&request)
    })
}

/// Round trip visiting every coordinate in an optimized order.
///
/// # Safety
///
/// `coordinates` must point to `2 * num_coordinates` doubles (or be NULL when the count is 0).
#[no_mangle]
pub unsafe extern "C" fn osrm_trip(
    instance: *mut OsrmInstance,
    coordinates: *const f64,
    num_coordinates: usize,
) -> OsrmResult {
    guarded_query("osrm_trip", || {
        let engine = lookup(instance)?;
        let request = TripRequest::new(unsafe { caller_points(coordinates, num_coordinates)? });
        OsrmEngine::from_backend(engine).trip_json(&request)
    })
}

/// Free a string allocated by the library
///
/// # Safety
///
/// `s` must be NULL or a `message` / `osrm_last_error_message()` pointer not
/// yet freed.
#[no_mangle]
pub unsafe extern "C" fn osrm_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}

/// Library version string. Static, do not free.
#[no_mangle]
pub extern "C" fn osrm_bridge_version() -> *const c_char {
    static VERSION_BYTES: &[u8] =
        concat!("osrm-bridge ", env!("OSRM_BRIDGE_VERSION"), "\0").as_bytes();
    VERSION_BYTES.as_ptr() as *const c_char
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::EngineReply;

    struct EchoEngine;

    impl RoutingEngine for EchoEngine {
        fn table(&self, c: &[Point], s: &[usize], d: &[usize]) -> Result<EngineReply> {
            Ok(EngineReply::ok(format!(
                r#"{{"code":"Ok","n":{},"s":{},"d":{}}}"#,
                c.len(),
                s.len(),
                d.len()
            )))
        }
        fn route(&self, c: &[Point]) -> Result<EngineReply> {
            Ok(EngineReply::ok(format!(r#"{{"code":"Ok","first":"{}"}}"#, c[0])))
        }
        fn trip(&self, _: &[Point]) -> Result<EngineReply> {
            panic!("trip exploded");
        }
    }

    fn take(result: OsrmResult) -> (c_int, String) {
        assert!(!result.message.is_null());
        let text = unsafe { CStr::from_ptr(result.message) }
            .to_str()
            .unwrap()
            .to_string();
        unsafe { osrm_free_string(result.message) };
        (result.code, text)
    }

    fn echo_handle() -> *mut OsrmInstance {
        register_engine(&OsrmEngine::from_backend(Arc::new(EchoEngine)))
    }

    #[test]
    fn test_version() {
        let version = unsafe { CStr::from_ptr(osrm_bridge_version()) }.to_str().unwrap();
        assert!(version.starts_with("osrm-bridge "));
        assert!(version.contains(env!("OSRM_BRIDGE_VERSION")));
    }

    #[test]
    fn test_into_c_string_strips_nul() {
        let raw = into_c_string("a\0b".to_string());
        let text = unsafe { CStr::from_ptr(raw) }.to_str().unwrap().to_string();
        unsafe { osrm_free_string(raw) };
        assert_eq!(text, "ab");
    }

    #[test]
    fn test_null_handle_is_not_found() {
        let coords = [7.41, 43.73, 7.42, 43.74];
        let (code, msg) = take(unsafe { osrm_route(ptr::null_mut(), coords.as_ptr(), 2) });
        assert_eq!(code, OSRM_ERROR);
        assert_eq!(msg, "OSRM instance not found");
    }

    #[test]
    fn test_coordinates_are_deinterleaved() {
        let handle = echo_handle();
        let coords = [7.41, 43.73, 7.42, 43.74];
        let (code, msg) = take(unsafe { osrm_route(handle, coords.as_ptr(), 2) });
        assert_eq!(code, OSRM_OK);
        assert!(msg.contains(r#""first":"7.41,43.73""#), "{msg}");
        unsafe { osrm_destroy(handle) };
    }

    #[test]
    fn test_table_null_index_pointer() {
        let handle = echo_handle();
        let coords = [7.41, 43.73, 7.42, 43.74];
        let (code, msg) =
            take(unsafe { osrm_table(handle, coords.as_ptr(), 2, ptr::null(), 1, ptr::null(), 0) });
        assert_eq!(code, OSRM_ERROR);
        assert!(msg.contains("sources pointer is NULL"), "{msg}");
        unsafe { osrm_destroy(handle) };
    }

    #[test]
    fn test_panic_becomes_error_result() {
        let handle = echo_handle();
        let coords = [7.41, 43.73];
        let (code, msg) = take(unsafe { osrm_trip(handle, coords.as_ptr(), 1) });
        assert_eq!(code, OSRM_ERROR);
        assert_eq!(msg, "internal panic in osrm_trip");
        unsafe { osrm_destroy(handle) };
    }

    #[test]
    fn test_create_failure_sets_last_error() {
        let path = CString::new("/nonexistent/monaco.osrm").unwrap();
        let algorithm = CString::new("CH").unwrap();
        let handle = unsafe { osrm_create(path.as_ptr(), algorithm.as_ptr()) };
        assert!(handle.is_null());

        let msg = osrm_last_error_message();
        assert!(!msg.is_null());
        let text = unsafe { CStr::from_ptr(msg) }.to_str().unwrap().to_string();
        unsafe { osrm_free_string(msg) };
        assert!(text.contains("monaco.osrm.hsgr"), "{text}");
    }

    #[test]
    fn test_create_null_path() {
        let handle = unsafe { osrm_create(ptr::null(), ptr::null()) };
        assert!(handle.is_null());
        let msg = osrm_last_error_message();
        let text = unsafe { CStr::from_ptr(msg) }.to_str().unwrap().to_string();
        unsafe { osrm_free_string(msg) };
        assert!(text.contains("storage_path is NULL"));
    }
}
