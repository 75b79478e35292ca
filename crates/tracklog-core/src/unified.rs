//! Entities backed by the pre-joined database views
//!
//! `unified_gps_points` merges OwnTracks and Garmin samples into one stream;
//! `daily_activity_summary` pre-aggregates per-day statistics. Both views are
//! owned by the external migration process and read-only here.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::spatial::PointSource;

/// One row of the unified GPS view
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnifiedGpsPoint {
    pub source: PointSource,
    pub identifier: String,
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp: DateTime<Utc>,
    pub accuracy: Option<i32>,
    pub battery: Option<i32>,
    pub speed_kmh: Option<f64>,
    pub heart_rate: Option<i32>,
    pub created_at: Option<DateTime<Utc>>,
}

/// One row of the daily activity summary view
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailySummary {
    pub activity_date: Option<NaiveDate>,
    pub owntracks_device: Option<String>,
    pub owntracks_points: Option<i64>,
    pub min_battery: Option<i32>,
    pub max_battery: Option<i32>,
    pub avg_accuracy: Option<f64>,
    pub garmin_sport: Option<String>,
    pub garmin_activities: Option<i64>,
    pub total_distance_km: Option<f64>,
    pub total_duration_seconds: Option<i64>,
    pub avg_heart_rate: Option<f64>,
    pub total_calories: Option<i64>,
}
