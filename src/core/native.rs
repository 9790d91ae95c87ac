//! libosrm-backed engine
//!
//! The engine is C++, so calls go through `cpp/osrm_shim.cpp`, a thin
//! `extern "C"` layer compiled by `build.rs` when the `native` feature is
//! enabled. The shim never lets a C++ exception escape: construction
//! failures come back as an owned error string, and every query reply is the
//! engine's JSON object rendered by the engine itself.
//!
//! Without the `native` feature [`NativeEngine::open`] fails with
//! [`Error::NativeUnavailable`].

use crate::core::backend::{EngineReply, RoutingEngine};
use crate::core::config::EngineConfig;
use crate::core::error::{Error, Result};
use crate::core::point::Point;

#[cfg(feature = "native")]
mod sys {
    use libc::{c_char, c_int, c_void, size_t};

    pub const ALGORITHM_CH: c_int = 0;
    pub const ALGORITHM_MLD: c_int = 1;

    pub const STATUS_OK: c_int = 0;

    /// Matches `osrm_shim_config` in cpp/osrm_shim.cpp
    #[repr(C)]
    pub struct ShimConfig {
        pub storage_path: *const c_char,
        pub algorithm: c_int,
        pub use_shared_memory: c_int,
        pub max_locations_trip: c_int,
        pub max_locations_viaroute: c_int,
        pub max_locations_distance_table: c_int,
    }

    extern "C" {
        pub fn osrm_shim_create(config: *const ShimConfig, error_out: *mut *mut c_char) -> *mut c_void;
        pub fn osrm_shim_destroy(instance: *mut c_void);
        pub fn osrm_shim_table(
            instance: *mut c_void,
            coordinates: *const f64,
            num_coordinates: size_t,
            sources: *const size_t,
            num_sources: size_t,
            destinations: *const size_t,
            num_destinations: size_t,
            status_out: *mut c_int,
        ) -> *mut c_char;
        pub fn osrm_shim_route(
            instance: *mut c_void,
            coordinates: *const f64,
            num_coordinates: size_t,
            status_out: *mut c_int,
        ) -> *mut c_char;
        pub fn osrm_shim_trip(
            instance: *mut c_void,
            coordinates: *const f64,
            num_coordinates: size_t,
            status_out: *mut c_int,
        ) -> *mut c_char;
        pub fn osrm_shim_free(s: *mut c_char);
    }
}

/// An `osrm::OSRM` instance owned through the shim
pub struct NativeEngine {
    #[cfg(feature = "native")]
    instance: std::ptr::NonNull<libc::c_void>,
    #[cfg(not(feature = "native"))]
    _unavailable: std::convert::Infallible,
}

// osrm::OSRM queries are const and safe to run concurrently; the instance is
// only mutated by its destructor, which runs from Drop.
unsafe impl Send for NativeEngine {}
unsafe impl Sync for NativeEngine {}

#[cfg(feature = "native")]
impl NativeEngine {
    /// Load the dataset described by `config`.
    pub fn open(config: &EngineConfig) -> Result<Self> {
        use std::ptr;

        use crate::core::algorithm::Algorithm;

        config.validate()?;

        let path = config.storage_path_c_string()?;
        let shim_config = sys::ShimConfig {
            storage_path: path.as_ptr(),
            algorithm: match config.algorithm {
                Algorithm::CH => sys::ALGORITHM_CH,
                Algorithm::MLD => sys::ALGORITHM_MLD,
            },
            use_shared_memory: libc::c_int::from(config.use_shared_memory),
            max_locations_trip: config.max_locations_trip,
            max_locations_viaroute: config.max_locations_viaroute,
            max_locations_distance_table: config.max_locations_distance_table,
        };

        let mut error: *mut libc::c_char = ptr::null_mut();
        let raw = unsafe { sys::osrm_shim_create(&shim_config, &mut error) };

        match std::ptr::NonNull::new(raw) {
            Some(instance) => Ok(Self { instance }),
            None => {
                let reason = unsafe { take_shim_string(error) }
                    .unwrap_or_else(|| "engine construction failed".to_string());
                Err(Error::Initialization(reason))
            }
        }
    }

    fn finish(&self, body: *mut libc::c_char, status: libc::c_int) -> Result<EngineReply> {
        let body = unsafe { take_shim_string(body) }
            .ok_or_else(|| Error::Ffi("OSRM returned a null message".to_string()))?;
        if status == sys::STATUS_OK {
            Ok(EngineReply::ok(body))
        } else {
            Ok(EngineReply::error(body))
        }
    }
}

#[cfg(not(feature = "native"))]
impl NativeEngine {
    /// Always fails: the crate was built without libosrm.
    pub fn open(config: &EngineConfig) -> Result<Self> {
        config.validate()?;
        log::warn!("NativeEngine::open called without the native feature");
        Err(Error::NativeUnavailable)
    }
}

/// Copy a shim-allocated string into Rust and release the original.
///
/// # Safety
///
/// `s` must be NULL or a pointer returned by the shim and not yet freed.
#[cfg(feature = "native")]
unsafe fn take_shim_string(s: *mut libc::c_char) -> Option<String> {
    if s.is_null() {
        return None;
    }
    let owned = std::ffi::CStr::from_ptr(s).to_string_lossy().into_owned();
    sys::osrm_shim_free(s);
    Some(owned)
}

#[cfg(feature = "native")]
impl RoutingEngine for NativeEngine {
    fn table(
        &self,
        coordinates: &[Point],
        sources: &[usize],
        destinations: &[usize],
    ) -> Result<EngineReply> {
        let flat = crate::core::point::flatten(coordinates);
        let mut status = 0;
        let body = unsafe {
            sys::osrm_shim_table(
                self.instance.as_ptr(),
                flat.as_ptr(),
                coordinates.len(),
                sources.as_ptr(),
                sources.len(),
                destinations.as_ptr(),
                destinations.len(),
                &mut status,
            )
        };
        self.finish(body, status)
    }

    fn route(&self, coordinates: &[Point]) -> Result<EngineReply> {
        let flat = crate::core::point::flatten(coordinates);
        let mut status = 0;
        let body = unsafe {
            sys::osrm_shim_route(self.instance.as_ptr(), flat.as_ptr(), coordinates.len(), &mut status)
        };
        self.finish(body, status)
    }

    fn trip(&self, coordinates: &[Point]) -> Result<EngineReply> {
        let flat = crate::core::point::flatten(coordinates);
        let mut status = 0;
        let body = unsafe {
            sys::osrm_shim_trip(self.instance.as_ptr(), flat.as_ptr(), coordinates.len(), &mut status)
        };
        self.finish(body, status)
    }
}

#[cfg(not(feature = "native"))]
impl RoutingEngine for NativeEngine {
    fn table(&self, _: &[Point], _: &[usize], _: &[usize]) -> Result<EngineReply> {
        match self._unavailable {}
    }

    fn route(&self, _: &[Point]) -> Result<EngineReply> {
        match self._unavailable {}
    }

    fn trip(&self, _: &[Point]) -> Result<EngineReply> {
        match self._unavailable {}
    }
}

#[cfg(feature = "native")]
impl Drop for NativeEngine {
    fn drop(&mut self) {
        unsafe { sys::osrm_shim_destroy(self.instance.as_ptr()) }
    }
}
