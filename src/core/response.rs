//! Typed views of the engine's JSON responses
//!
//! Only the fields produced by default query parameters are modelled;
//! optional ones default when absent so that payloads from other engine
//! versions still deserialize.

use serde::{Deserialize, Serialize};

/// A coordinate snapped to the road network
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Waypoint {
    #[serde(default)]
    pub hint: Option<String>,
    /// Snapped `[lon, lat]`
    pub location: [f64; 2],
    #[serde(default)]
    pub name: String,
    /// Distance in meters between input and snapped coordinate
    #[serde(default)]
    pub distance: f64,
}

/// Table service response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TableResponse {
    pub code: String,
    /// `durations[i][j]` in seconds from source i to destination j, null if unreachable
    #[serde(default)]
    pub durations: Vec<Vec<Option<f64>>>,
    /// Present only when distances were requested from the engine
    #[serde(default)]
    pub distances: Option<Vec<Vec<Option<f64>>>>,
    #[serde(default)]
    pub sources: Vec<Waypoint>,
    #[serde(default)]
    pub destinations: Vec<Waypoint>,
}

impl TableResponse {
    /// `(rows, columns)` of the duration matrix
    pub fn shape(&self) -> (usize, usize) {
        (
            self.durations.len(),
            self.durations.first().map_or(0, Vec::len),
        )
    }
}

/// One leg of a route, between two consecutive waypoints
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Leg {
    /// Turn-by-turn steps; empty unless steps were requested
    #[serde(default)]
    pub steps: Vec<serde_json::Value>,
    pub weight: f64,
    #[serde(default)]
    pub summary: String,
    pub duration: f64,
    pub distance: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Route {
    pub legs: Vec<Leg>,
    #[serde(default)]
    pub weight_name: String,
    /// Encoded polyline (the engine default geometry format)
    #[serde(default)]
    pub geometry: Option<serde_json::Value>,
    pub weight: f64,
    pub duration: f64,
    pub distance: f64,
}

/// Route service response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteResponse {
    pub code: String,
    pub routes: Vec<Route>,
    #[serde(default)]
    pub waypoints: Vec<Waypoint>,
}

/// Waypoint of a trip, with its position in the optimized order
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TripWaypoint {
    #[serde(default)]
    pub hint: Option<String>,
    pub location: [f64; 2],
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub distance: f64,
    /// Index of the trip this waypoint belongs to
    pub trips_index: usize,
    /// Position of the waypoint inside that trip
    pub waypoint_index: usize,
}

/// Trip service response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TripResponse {
    pub code: String,
    pub trips: Vec<Route>,
    /// In input order
    #[serde(default)]
    pub waypoints: Vec<TripWaypoint>,
}

impl TripResponse {
    /// Input indices in visiting order for trip `trip`.
    pub fn visiting_order(&self, trip: usize) -> Vec<usize> {
        let mut order: Vec<(usize, usize)> = self
            .waypoints
            .iter()
            .enumerate()
            .filter(|(_, w)| w.trips_index == trip)
            .map(|(input, w)| (w.waypoint_index, input))
            .collect();
        order.sort_unstable();
        order.into_iter().map(|(_, input)| input).collect()
    }
}

/// Duration and distance of the first leg between two points
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimpleRouteResponse {
    pub code: String,
    /// Seconds
    pub duration: f64,
    /// Meters
    pub distance: f64,
}
