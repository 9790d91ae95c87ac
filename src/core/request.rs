//! Query requests accepted by [`crate::OsrmEngine`]

use derive_builder::Builder;

use crate::core::error::{Error, Result};
use crate::core::point::Point;

/// Distance/duration matrix request.
///
/// Empty `sources` or `destinations` select every coordinate, so a request
/// with both empty computes the all-pairs matrix.
#[derive(Debug, Clone, Default, PartialEq, Builder)]
#[builder(build_fn(error = "Error"))]
pub struct TableRequest {
    pub coordinates: Vec<Point>,
    #[builder(default)]
    pub sources: Vec<usize>,
    #[builder(default)]
    pub destinations: Vec<usize>,
}

impl TableRequest {
    /// All-pairs matrix over `coordinates`.
    pub fn all_pairs(coordinates: Vec<Point>) -> Self {
        Self {
            coordinates,
            ..Default::default()
        }
    }

    /// Matrix from every point of `sources` to every point of `destinations`.
    ///
    /// Coordinates are laid out sources first, then destinations.
    pub fn between(sources: Vec<Point>, destinations: Vec<Point>) -> Result<Self> {
        if sources.is_empty() || destinations.is_empty() {
            return Err(Error::InvalidTableArgument);
        }
        let num_sources = sources.len();
        let num_destinations = destinations.len();

        let mut coordinates = sources;
        coordinates.extend(destinations);

        Ok(Self {
            coordinates,
            sources: (0..num_sources).collect(),
            destinations: (num_sources..num_sources + num_destinations).collect(),
        })
    }

    pub fn validate(&self) -> Result<()> {
        require_coordinates(&self.coordinates)?;
        let n = self.coordinates.len();
        for (kind, indices) in [("source", &self.sources), ("destination", &self.destinations)] {
            if let Some(bad) = indices.iter().find(|&&i| i >= n) {
                return Err(Error::InvalidArgument(format!(
                    "{kind} index {bad} out of range for {n} coordinates"
                )));
            }
        }
        Ok(())
    }
}

/// Path through waypoints in the given order
#[derive(Debug, Clone, Default, PartialEq, Builder)]
#[builder(build_fn(error = "Error"))]
pub struct RouteRequest {
    pub points: Vec<Point>,
}

impl RouteRequest {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn validate(&self) -> Result<()> {
        require_coordinates(&self.points)
    }
}

/// Optimized round trip over the waypoints
#[derive(Debug, Clone, Default, PartialEq, Builder)]
#[builder(build_fn(error = "Error"))]
pub struct TripRequest {
    pub points: Vec<Point>,
}

impl TripRequest {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn validate(&self) -> Result<()> {
        require_coordinates(&self.points)
    }
}

fn require_coordinates(points: &[Point]) -> Result<()> {
    if points.is_empty() {
        return Err(Error::InvalidArgument("at least one coordinate is required".to_string()));
    }
    Ok(())
}
