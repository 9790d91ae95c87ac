//! # osrm-bridge
//!
//! A bridge between the OSRM routing engine (C++) and the outside world.
//! Two surfaces are offered over the same engine:
//!
//! - **C ABI** ([`ffi`], [`logging`]): `osrm_create`, `osrm_table`,
//!   `osrm_route`, `osrm_trip`, `osrm_free_string` and friends, for C, C++,
//!   Python (ctypes) and other FFI consumers
//! - **Rust API** ([`OsrmEngine`]): typed requests and responses, plain
//!   `Result` values, nothing to free by hand
//!
//! Linking libosrm requires the `native` feature. Without it the crate still
//! builds, and any [`RoutingEngine`] implementation can be plugged in through
//! [`OsrmEngine::from_backend`].
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use osrm_bridge::{Algorithm, OsrmEngine, Point, TableRequest};
//!
//! fn main() -> Result<(), osrm_bridge::Error> {
//!     let engine = OsrmEngine::new("monaco-latest.osrm", Algorithm::MLD)?;
//!
//!     let casino = Point::new(7.4266, 43.7397);
//!     let harbour = Point::new(7.4209, 43.7351);
//!     let summary = engine.simple_route(casino, harbour)?;
//!     println!("{:.0} s, {:.0} m", summary.duration, summary.distance);
//!
//!     let table = engine.table(TableRequest::all_pairs(vec![casino, harbour]))?;
//!     println!("{:?}", table.durations);
//!     Ok(())
//! }
//! ```

mod core;

pub mod ffi;
pub mod logging;

pub use crate::core::config::{ALGORITHM_ENV, DATA_PATH_ENV, UNLIMITED};
pub use crate::core::registry;
pub use crate::core::{
    reply_into_payload, Algorithm, EngineConfig, EngineReply, Error, Leg, NativeEngine,
    OsrmEngine, Point, PointBuilder, Result, Route, RouteRequest, RouteRequestBuilder,
    RouteResponse, RoutingEngine, SimpleRouteResponse, Status, TableRequest, TableRequestBuilder,
    TableResponse, TripRequest, TripRequestBuilder, TripResponse, TripWaypoint, Waypoint,
    UNKNOWN_ENGINE_ERROR,
};
