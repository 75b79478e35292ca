//! Garmin activity and track point entities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A recorded fitness activity with its aggregate metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub activity_id: String,
    pub sport: String,
    pub sub_sport: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub distance_km: Option<f64>,
    pub duration_seconds: Option<i32>,
    pub avg_heart_rate: Option<i32>,
    pub max_heart_rate: Option<i32>,
    pub avg_cadence: Option<i32>,
    pub max_cadence: Option<i32>,
    pub calories: Option<i32>,
    pub avg_speed_kmh: Option<f64>,
    pub max_speed_kmh: Option<f64>,
    pub total_ascent_m: Option<i32>,
    pub total_descent_m: Option<i32>,
    pub total_distance: Option<f64>,
    pub avg_pace: Option<f64>,
    pub device_manufacturer: Option<String>,
    pub avg_temperature_c: Option<i32>,
    pub min_temperature_c: Option<i32>,
    pub max_temperature_c: Option<i32>,
    pub total_elapsed_time: Option<f64>,
    pub total_timer_time: Option<f64>,
    pub created_at: Option<DateTime<Utc>>,
    pub uploaded_at: Option<DateTime<Utc>>,
    /// Number of distinct track point timestamps for this activity
    pub track_point_count: Option<i64>,
}

/// One GPS sample belonging to an activity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackPoint {
    pub id: i64,
    pub activity_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp: DateTime<Utc>,
    pub altitude: Option<f64>,
    pub distance_from_start_km: Option<f64>,
    pub speed_kmh: Option<f64>,
    pub heart_rate: Option<i32>,
    pub cadence: Option<i32>,
    pub temperature_c: Option<i32>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Time-series sample for chart rendering (no row identity)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp: DateTime<Utc>,
    pub altitude: Option<f64>,
    pub distance_from_start_km: Option<f64>,
    pub speed_kmh: Option<f64>,
    pub heart_rate: Option<i32>,
    pub cadence: Option<i32>,
    pub temperature_c: Option<i32>,
}

/// A bare coordinate on a simplified route
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoutePoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// A Douglas-Peucker-simplified activity route
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimplifiedRoute {
    pub activity_id: String,
    pub tolerance: f64,
    pub point_count: usize,
    pub points: Vec<RoutePoint>,
}

/// A sport type with its activity count
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SportCount {
    pub sport: String,
    pub activity_count: i64,
}
