//! Geographic value objects
//!
//! `GeoPoint` is a validated WGS84 latitude/longitude pair. Construction is
//! the single place where coordinate ranges are checked, so everything
//! downstream can rely on a point being on the globe.

use geo::{Distance, Haversine, Point};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// A WGS84 coordinate pair in degrees.
///
/// Latitude comes first in the constructor and everywhere in this codebase;
/// the PostGIS longitude-first convention is reconciled in exactly one place
/// (the spatial predicate builder in `tracklog-db`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    lat: f64,
    lon: f64,
}

impl GeoPoint {
    /// Create a point, validating coordinate ranges.
    pub fn new(lat: f64, lon: f64) -> DomainResult<Self> {
        if !(-90.0..=90.0).contains(&lat) || !lat.is_finite() {
            return Err(DomainError::validation(format!(
                "latitude {lat} outside [-90, 90]"
            )));
        }
        if !(-180.0..=180.0).contains(&lon) || !lon.is_finite() {
            return Err(DomainError::validation(format!(
                "longitude {lon} outside [-180, 180]"
            )));
        }
        Ok(Self { lat, lon })
    }

    /// Latitude in degrees
    pub fn latitude(&self) -> f64 {
        self.lat
    }

    /// Longitude in degrees
    pub fn longitude(&self) -> f64 {
        self.lon
    }

    /// Great-circle distance to another point, in meters.
    ///
    /// This is the pure-Rust counterpart of the PostGIS `ST_Distance` used by
    /// the query layer; it exists for tests and in-memory fixtures.
    pub fn haversine_distance_m(&self, other: &GeoPoint) -> f64 {
        let a = Point::new(self.lon, self.lat);
        let b = Point::new(other.lon, other.lat);
        Haversine::distance(a, b)
    }
}
