//! Shared fixtures for the integration tests
//!
//! `FakeEngine` answers like OSRM would for a straight road along the
//! longitude axis: one degree costs 60 seconds and 1000 meters.

#![allow(dead_code)]

use std::ffi::CStr;
use std::os::raw::c_int;
use std::sync::Arc;

use osrm_bridge::ffi::{osrm_free_string, register_engine, OsrmInstance, OsrmResult};
use osrm_bridge::{EngineReply, OsrmEngine, Point, Result, RoutingEngine};
use serde_json::json;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Answers every well-formed query
    Healthy,
    /// Fails every query with a payload lacking a `message` field
    Mute,
}

pub struct FakeEngine {
    mode: Mode,
}

impl FakeEngine {
    pub fn new(mode: Mode) -> Self {
        Self { mode }
    }
}

fn cost(a: &Point, b: &Point) -> (f64, f64) {
    let degrees = (a.longitude - b.longitude).abs() + (a.latitude - b.latitude).abs();
    (degrees * 60.0, degrees * 1000.0)
}

fn waypoint(p: &Point) -> serde_json::Value {
    json!({"hint": "", "distance": 0.0, "name": "", "location": [p.longitude, p.latitude]})
}

fn route_object(points: &[Point]) -> serde_json::Value {
    let legs: Vec<_> = points
        .windows(2)
        .map(|pair| {
            let (duration, distance) = cost(&pair[0], &pair[1]);
            json!({"steps": [], "summary": "", "weight": duration, "duration": duration, "distance": distance})
        })
        .collect();
    let duration: f64 = legs.iter().map(|l| l["duration"].as_f64().unwrap_or(0.0)).sum();
    let distance: f64 = legs.iter().map(|l| l["distance"].as_f64().unwrap_or(0.0)).sum();
    json!({
        "legs": legs,
        "weight_name": "routability",
        "weight": duration,
        "duration": duration,
        "distance": distance
    })
}

fn too_few_coordinates() -> EngineReply {
    EngineReply::error(
        json!({"code": "InvalidOptions", "message": "Number of coordinates needs to be at least two"})
            .to_string(),
    )
}

impl RoutingEngine for FakeEngine {
    fn table(
        &self,
        coordinates: &[Point],
        sources: &[usize],
        destinations: &[usize],
    ) -> Result<EngineReply> {
        if self.mode == Mode::Mute {
            return Ok(EngineReply::error(r#"{"code":"NoTable"}"#));
        }
        let all: Vec<usize> = (0..coordinates.len()).collect();
        let rows = if sources.is_empty() { &all[..] } else { sources };
        let cols = if destinations.is_empty() { &all[..] } else { destinations };

        let durations: Vec<Vec<f64>> = rows
            .iter()
            .map(|&i| cols.iter().map(|&j| cost(&coordinates[i], &coordinates[j]).0).collect())
            .collect();

        Ok(EngineReply::ok(
            json!({
                "code": "Ok",
                "durations": durations,
                "sources": rows.iter().map(|&i| waypoint(&coordinates[i])).collect::<Vec<_>>(),
                "destinations": cols.iter().map(|&j| waypoint(&coordinates[j])).collect::<Vec<_>>()
            })
            .to_string(),
        ))
    }

    fn route(&self, coordinates: &[Point]) -> Result<EngineReply> {
        if self.mode == Mode::Mute {
            return Ok(EngineReply::error(r#"{"code":"NoRoute"}"#));
        }
        if coordinates.len() < 2 {
            return Ok(too_few_coordinates());
        }
        Ok(EngineReply::ok(
            json!({
                "code": "Ok",
                "routes": [route_object(coordinates)],
                "waypoints": coordinates.iter().map(waypoint).collect::<Vec<_>>()
            })
            .to_string(),
        ))
    }

    fn trip(&self, coordinates: &[Point]) -> Result<EngineReply> {
        if self.mode == Mode::Mute {
            return Ok(EngineReply::error(r#"{"code":"NoTrips"}"#));
        }
        if coordinates.len() < 2 {
            return Ok(too_few_coordinates());
        }
        // Visit in reverse input order, then come back to the start
        let mut order: Vec<Point> = coordinates.iter().rev().copied().collect();
        order.push(order[0]);
        let n = coordinates.len();
        let waypoints: Vec<_> = coordinates
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let mut w = waypoint(p);
                w["trips_index"] = json!(0);
                w["waypoint_index"] = json!(n - 1 - i);
                w
            })
            .collect();

        Ok(EngineReply::ok(
            json!({"code": "Ok", "trips": [route_object(&order)], "waypoints": waypoints})
                .to_string(),
        ))
    }
}

pub fn engine(mode: Mode) -> OsrmEngine {
    OsrmEngine::from_backend(Arc::new(FakeEngine::new(mode)))
}

/// A live C handle backed by a `FakeEngine`
pub fn handle(mode: Mode) -> *mut OsrmInstance {
    register_engine(&engine(mode))
}

/// Interleaved Monaco coordinates, `n` pairs
pub fn monaco(n: usize) -> Vec<f64> {
    (0..n)
        .flat_map(|i| [7.41 + i as f64 * 0.01, 43.73])
        .collect()
}

/// Copy out a result message and release it.
pub fn take(result: OsrmResult) -> (c_int, String) {
    assert!(!result.message.is_null(), "message must never be NULL");
    let text = unsafe { CStr::from_ptr(result.message) }
        .to_str()
        .expect("message is UTF-8")
        .to_string();
    unsafe { osrm_free_string(result.message) };
    (result.code, text)
}
