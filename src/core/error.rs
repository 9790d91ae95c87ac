//! Error types for osrm-bridge
//!
//! Every fallible operation of the safe Rust API returns [`Result`]. The C ABI
//! flattens these into a status code and a message string.

use thiserror::Error;

/// Fallback message when an engine error payload carries no `message` field
pub const UNKNOWN_ENGINE_ERROR: &str = "Unknown OSRM error";

/// Main error type for osrm-bridge operations
#[derive(Error, Debug)]
pub enum Error {
    /// The engine could not be constructed from the given configuration
    #[error("Failed to create OSRM instance: {0}")]
    Initialization(String),

    /// Algorithm selector outside of {"CH", "MLD"}
    #[error("Unknown routing algorithm '{0}' (expected \"CH\" or \"MLD\")")]
    InvalidAlgorithm(String),

    /// Storage path unusable before the engine is even consulted
    #[error("Invalid path parameter: {0}")]
    InvalidPath(String),

    /// A dataset file required by the selected algorithm is absent
    #[error("Missing {algorithm} dataset file: {path}")]
    MissingDataset { path: String, algorithm: String },

    /// Query arguments rejected before forwarding
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Table requests need at least one source and one destination
    #[error("Sources or destinations are invalid")]
    InvalidTableArgument,

    /// Handle is null, unknown, or already destroyed
    #[error("OSRM instance not found")]
    InstanceNotFound,

    /// The engine answered with a non-Ok status
    #[error("OSRM API error ({code}): {message}")]
    Api { code: String, message: String },

    /// The engine succeeded but returned no route
    #[error("No route was returned between those points")]
    NoRoute,

    /// The engine payload did not match the expected response schema
    #[error("Failed to parse OSRM response: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Marshaling across the native boundary failed
    #[error("Internal FFI error: {0}")]
    Ffi(String),

    /// The crate was built without the `native` feature
    #[error("native OSRM support is not compiled in (enable the `native` feature)")]
    NativeUnavailable,
}

impl Error {
    /// Message handed to C callers in `OsrmResult::message`.
    ///
    /// Engine errors expose the engine's own message verbatim; every other
    /// variant uses its `Display` form.
    pub fn caller_message(&self) -> String {
        match self {
            Error::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<derive_builder::UninitializedFieldError> for Error {
    fn from(err: derive_builder::UninitializedFieldError) -> Self {
        Error::InvalidArgument(format!("{} must be set", err.field_name()))
    }
}

/// Convenience result type for osrm-bridge operations
pub type Result<T> = std::result::Result<T, Error>;
