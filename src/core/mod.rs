//! Core library modules for osrm-bridge
//!
//! Everything below the C ABI: configuration, the engine seam, the native
//! libosrm backend, the handle registry and the typed request/response model.

pub mod algorithm;
pub mod backend;
pub mod config;
pub mod engine;
pub mod error;
pub mod native;
pub mod point;
pub mod registry;
pub mod request;
pub mod response;

pub use algorithm::Algorithm;
pub use backend::{reply_into_payload, EngineReply, RoutingEngine, Status};
pub use config::EngineConfig;
pub use engine::OsrmEngine;
pub use error::{Error, Result, UNKNOWN_ENGINE_ERROR};
pub use native::NativeEngine;
pub use point::{Point, PointBuilder};
pub use request::{
    RouteRequest, RouteRequestBuilder, TableRequest, TableRequestBuilder, TripRequest,
    TripRequestBuilder,
};
pub use response::{
    Leg, Route, RouteResponse, SimpleRouteResponse, TableResponse, TripResponse, TripWaypoint,
    Waypoint,
};
