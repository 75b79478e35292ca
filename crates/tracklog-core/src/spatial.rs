//! Spatial query result types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which dataset a GPS point came from.
///
/// This is a closed set: deserializing or parsing an unknown value is an
/// error, never a silently empty result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointSource {
    Owntracks,
    Garmin,
}

impl fmt::Display for PointSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Owntracks => write!(f, "owntracks"),
            Self::Garmin => write!(f, "garmin"),
        }
    }
}

impl FromStr for PointSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owntracks" => Ok(Self::Owntracks),
            "garmin" => Ok(Self::Garmin),
            other => Err(format!("unknown point source: {other}")),
        }
    }
}

/// A GPS point matched by a radius search, with its distance from the center
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearbyPoint {
    pub source: PointSource,
    pub id: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub distance_meters: f64,
    pub timestamp: DateTime<Utc>,
}

/// Result of the point-to-point distance computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistanceResult {
    pub distance_meters: f64,
    pub from_lat: f64,
    pub from_lon: f64,
    pub to_lat: f64,
    pub to_lon: f64,
}

/// Points contained in a named reference location's radius
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithinReferenceResult {
    pub reference_name: String,
    pub radius_meters: f64,
    pub total_points: i64,
    pub points: Vec<NearbyPoint>,
}
