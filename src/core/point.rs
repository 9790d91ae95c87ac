//! Geographic coordinates and their flat wire layout

use std::fmt;
use std::str::FromStr;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::core::error::Error;

/// A WGS84 coordinate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Builder)]
#[builder(build_fn(error = "Error"))]
pub struct Point {
    pub longitude: f64,
    pub latitude: f64,
}

impl Point {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self { longitude, latitude }
    }
}

impl FromStr for Point {
    type Err = Error;

    /// Parses the OSRM URL notation `lon,lat`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lon, lat) = s
            .split_once(',')
            .ok_or_else(|| Error::InvalidArgument(format!("expected 'lon,lat', got '{s}'")))?;

        let parse = |part: &str| {
            part.trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| Error::InvalidArgument(format!("invalid coordinate '{s}'")))
        };

        Ok(Point::new(parse(lon)?, parse(lat)?))
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.longitude, self.latitude)
    }
}

/// Interleave points as `[lon0, lat0, lon1, lat1, ...]`.
pub fn flatten(points: &[Point]) -> Vec<f64> {
    points
        .iter()
        .flat_map(|p| [p.longitude, p.latitude])
        .collect()
}

/// Rebuild points from an interleaved slice.
///
/// A trailing unpaired value is rejected rather than silently dropped.
pub fn from_interleaved(flat: &[f64]) -> Result<Vec<Point>, Error> {
    if flat.len() % 2 != 0 {
        return Err(Error::InvalidArgument(format!(
            "interleaved coordinate array has odd length {}",
            flat.len()
        )));
    }
    Ok(flat
        .chunks_exact(2)
        .map(|pair| Point::new(pair[0], pair[1]))
        .collect())
}
