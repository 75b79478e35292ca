//! OwnTracks location point entities
//!
//! Rows of `public.locations`, written by the ingestion pipeline and
//! read-only for this service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single recorded GPS location point
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub id: i64,
    pub device_id: String,
    pub tid: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: Option<i32>,
    pub altitude: Option<f64>,
    pub velocity: Option<i32>,
    pub battery: Option<i32>,
    pub battery_status: Option<i32>,
    pub connection_type: Option<String>,
    pub trigger: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub created_at: Option<DateTime<Utc>>,
}

/// A location point plus the raw ingestion payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationDetail {
    #[serde(flatten)]
    pub location: Location,
    pub raw_payload: Option<serde_json::Value>,
}

/// Result of the location count operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationCount {
    pub count: i64,
    pub date: Option<chrono::NaiveDate>,
    pub device_id: Option<String>,
}
