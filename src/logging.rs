//! Logging initialization for the C ABI
//!
//! The library only emits records through the `log` facade. A C host picks
//! where they go: stderr through `env_logger`, or its own sink through
//! [`osrm_set_log_callback`]. Rust hosts install whatever logger they like.

use std::ffi::CString;
use std::os::raw::{c_char, c_int, c_void};
use std::sync::{OnceLock, RwLock};

use log::{Level, LevelFilter, Log, Metadata, Record};

/// Log level for osrm-bridge logging
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsrmLogLevel {
    OsrmLogOff = 0,
    OsrmLogError = 1,
    OsrmLogWarn = 2,
    OsrmLogInfo = 3,
    OsrmLogDebug = 4,
    OsrmLogTrace = 5,
}

impl From<OsrmLogLevel> for LevelFilter {
    fn from(level: OsrmLogLevel) -> Self {
        match level {
            OsrmLogLevel::OsrmLogOff => LevelFilter::Off,
            OsrmLogLevel::OsrmLogError => LevelFilter::Error,
            OsrmLogLevel::OsrmLogWarn => LevelFilter::Warn,
            OsrmLogLevel::OsrmLogInfo => LevelFilter::Info,
            OsrmLogLevel::OsrmLogDebug => LevelFilter::Debug,
            OsrmLogLevel::OsrmLogTrace => LevelFilter::Trace,
        }
    }
}

impl From<Level> for OsrmLogLevel {
    fn from(level: Level) -> Self {
        match level {
            Level::Error => OsrmLogLevel::OsrmLogError,
            Level::Warn => OsrmLogLevel::OsrmLogWarn,
            Level::Info => OsrmLogLevel::OsrmLogInfo,
            Level::Debug => OsrmLogLevel::OsrmLogDebug,
            Level::Trace => OsrmLogLevel::OsrmLogTrace,
        }
    }
}

/// Status returned by the logging initializers
pub const OSRM_LOG_OK: c_int = 0;
/// Another logger already owns the `log` facade
pub const OSRM_LOG_ALREADY_SET: c_int = 1;

/// Receives one log record.
///
/// `target` and `message` are only valid for the duration of the call.
pub type OsrmLogCallback = extern "C" fn(
    level: OsrmLogLevel,
    target: *const c_char,
    message: *const c_char,
    user_data: *mut c_void,
);

struct Sink {
    callback: OsrmLogCallback,
    // Stored as an address so the logger stays Send + Sync
    user_data: usize,
}

struct CallbackLogger {
    sink: RwLock<Option<Sink>>,
}

static CALLBACK_LOGGER: CallbackLogger = CallbackLogger {
    sink: RwLock::new(None),
};

/// Whether `CALLBACK_LOGGER` won the one-shot `log::set_logger` slot
static CALLBACK_INSTALLED: OnceLock<bool> = OnceLock::new();

fn lossy_c_string(s: &str) -> CString {
    CString::new(s.replace('\0', "")).unwrap_or_default()
}

impl Log for CallbackLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
            && self
                .sink
                .read()
                .map(|sink| sink.is_some())
                .unwrap_or(false)
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        // Copied out so the callback may re-enter osrm_set_log_callback
        let sink = self
            .sink
            .read()
            .unwrap_or_else(|err| err.into_inner())
            .as_ref()
            .map(|sink| (sink.callback, sink.user_data));

        if let Some((callback, user_data)) = sink {
            let target = lossy_c_string(record.target());
            let message = lossy_c_string(&record.args().to_string());
            callback(
                record.level().into(),
                target.as_ptr(),
                message.as_ptr(),
                user_data as *mut c_void,
            );
        }
    }

    fn flush(&self) {}
}

/// Initialize logging to stderr
///
/// # Arguments
/// * `level` - Minimum log level to display
///
/// # Returns
/// `OSRM_LOG_OK` on success, `OSRM_LOG_ALREADY_SET` if a logger is already installed
///
/// # Example (C)
/// ```c
/// osrm_logging_init(OSRM_LOG_INFO);
/// ```
#[no_mangle]
pub extern "C" fn osrm_logging_init(level: OsrmLogLevel) -> c_int {
    let filter: LevelFilter = level.into();

    match env_logger::Builder::new()
        .filter_level(filter)
        .target(env_logger::Target::Stderr)
        .format_timestamp_millis()
        .try_init()
    {
        Ok(()) => OSRM_LOG_OK,
        Err(_) => OSRM_LOG_ALREADY_SET,
    }
}

/// Initialize logging to stderr, honouring `RUST_LOG` when it is set
///
/// # Arguments
/// * `default_level` - Log level used when `RUST_LOG` is not set
#[no_mangle]
pub extern "C" fn osrm_logging_init_env(default_level: OsrmLogLevel) -> c_int {
    let filter: LevelFilter = default_level.into();

    match env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(filter.to_string()),
    )
    .target(env_logger::Target::Stderr)
    .format_timestamp_millis()
    .try_init()
    {
        Ok(()) => OSRM_LOG_OK,
        Err(_) => OSRM_LOG_ALREADY_SET,
    }
}

/// Forward log records to a C callback
///
/// The first call installs the forwarding logger. Later calls replace the
/// callback, its `user_data` and the level. A NULL callback detaches the
/// current one; records are then dropped.
///
/// # Returns
/// `OSRM_LOG_OK` on success, `OSRM_LOG_ALREADY_SET` if a different logger
/// (e.g. from `osrm_logging_init`) already owns the `log` facade.
///
/// # Example (C)
/// ```c
/// void on_log(OsrmLogLevel level, const char* target, const char* msg, void* ctx) {
///     fprintf((FILE*)ctx, "[%d] %s: %s\n", level, target, msg);
/// }
/// osrm_set_log_callback(on_log, OSRM_LOG_DEBUG, stderr);
/// ```
#[no_mangle]
pub extern "C" fn osrm_set_log_callback(
    callback: Option<OsrmLogCallback>,
    level: OsrmLogLevel,
    user_data: *mut c_void,
) -> c_int {
    let Some(callback) = callback else {
        *CALLBACK_LOGGER
            .sink
            .write()
            .unwrap_or_else(|err| err.into_inner()) = None;
        return OSRM_LOG_OK;
    };

    let installed = *CALLBACK_INSTALLED.get_or_init(|| log::set_logger(&CALLBACK_LOGGER).is_ok());
    if !installed {
        return OSRM_LOG_ALREADY_SET;
    }

    *CALLBACK_LOGGER
        .sink
        .write()
        .unwrap_or_else(|err| err.into_inner()) = Some(Sink {
        callback,
        user_data: user_data as usize,
    });
    log::set_max_level(level.into());
    OSRM_LOG_OK
}
