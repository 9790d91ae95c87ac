//! Safe Rust entry point
//!
//! [`OsrmEngine`] owns a routing engine and exposes the table, route and trip
//! services with typed requests and responses. Results are plain
//! `Result<T, Error>` values; nothing has to be freed by hand.

use std::sync::Arc;

use log::{debug, info};
use serde::de::DeserializeOwned;

use crate::core::algorithm::Algorithm;
use crate::core::backend::{reply_into_payload, RoutingEngine};
use crate::core::config::EngineConfig;
use crate::core::error::{Error, Result};
use crate::core::native::NativeEngine;
use crate::core::point::Point;
use crate::core::request::{RouteRequest, TableRequest, TripRequest};
use crate::core::response::{RouteResponse, SimpleRouteResponse, TableResponse, TripResponse};

/// A loaded routing engine. Cheap to clone; clones share the instance.
#[derive(Clone)]
pub struct OsrmEngine {
    backend: Arc<dyn RoutingEngine>,
}

impl std::fmt::Debug for OsrmEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OsrmEngine").finish_non_exhaustive()
    }
}

impl OsrmEngine {
    /// Load the dataset at `base_path` (e.g. `france-latest.osrm`).
    pub fn new(base_path: &str, algorithm: Algorithm) -> Result<Self> {
        Self::with_config(EngineConfig::new(base_path, algorithm))
    }

    /// Load a dataset with full control over the engine configuration.
    pub fn with_config(config: EngineConfig) -> Result<Self> {
        let engine = NativeEngine::open(&config)?;
        info!(
            "Loaded OSRM dataset {} ({})",
            config.storage_path.display(),
            config.algorithm
        );
        Ok(Self::from_backend(Arc::new(engine)))
    }

    /// Wrap an already constructed backend.
    pub fn from_backend(backend: Arc<dyn RoutingEngine>) -> Self {
        Self { backend }
    }

    /// Shared handle on the backend, used when registering with the C ABI.
    pub fn backend(&self) -> Arc<dyn RoutingEngine> {
        Arc::clone(&self.backend)
    }

    /// Table service, raw engine JSON.
    pub fn table_json(&self, request: &TableRequest) -> Result<String> {
        request.validate()?;
        debug!(
            "table: {} coordinates, {} sources, {} destinations",
            request.coordinates.len(),
            request.sources.len(),
            request.destinations.len()
        );
        let reply = self
            .backend
            .table(&request.coordinates, &request.sources, &request.destinations)?;
        reply_into_payload(reply)
    }

    /// Route service, raw engine JSON.
    pub fn route_json(&self, request: &RouteRequest) -> Result<String> {
        request.validate()?;
        debug!("route: {} coordinates", request.points.len());
        reply_into_payload(self.backend.route(&request.points)?)
    }

    /// Trip service, raw engine JSON.
    pub fn trip_json(&self, request: &TripRequest) -> Result<String> {
        request.validate()?;
        debug!("trip: {} coordinates", request.points.len());
        reply_into_payload(self.backend.trip(&request.points)?)
    }

    pub fn table(&self, request: TableRequest) -> Result<TableResponse> {
        parse(&self.table_json(&request)?)
    }

    pub fn route(&self, request: RouteRequest) -> Result<RouteResponse> {
        parse(&self.route_json(&request)?)
    }

    pub fn trip(&self, request: TripRequest) -> Result<TripResponse> {
        parse(&self.trip_json(&request)?)
    }

    /// Duration and distance of the fastest route between two points.
    pub fn simple_route(&self, from: Point, to: Point) -> Result<SimpleRouteResponse> {
        let response = self.route(RouteRequest::new(vec![from, to]))?;
        let leg = response
            .routes
            .first()
            .and_then(|route| route.legs.first())
            .ok_or(Error::NoRoute)?;

        Ok(SimpleRouteResponse {
            code: response.code.clone(),
            duration: leg.duration,
            distance: leg.distance,
        })
    }
}

fn parse<T: DeserializeOwned>(payload: &str) -> Result<T> {
    Ok(serde_json::from_str(payload)?)
}
