//! Seed data and in-memory repository fakes
//!
//! The fakes reimplement the repository contracts over plain vectors: same
//! filter semantics, same ordering and tie-break rules, same error variants.
//! Spatial distances use the pure haversine helper instead of PostGIS.

use std::cmp::Ordering;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use tracklog_core::{
    Activity, ChartPoint, DailySummary, GeoPoint, Location, LocationCount, LocationDetail,
    NearbyPoint, NewReferenceLocation, Page, PointSource, ReferenceLocation,
    ReferenceLocationPatch, RoutePoint, SimplifiedRoute, SportCount, TrackPoint, UnifiedGpsPoint,
    WithinReferenceResult,
};
use tracklog_db::activities::{MAX_SIMPLIFY_TOLERANCE, MIN_SIMPLIFY_TOLERANCE};
use tracklog_db::spatial::MAX_RADIUS_METERS;
use tracklog_db::{
    ActivityFilter, ActivityRepository, ActivitySortKey, DbError, DbHealth, DbResult,
    LocationFilter, LocationRepository, LocationSortKey, NearbyQuery, PageParams, ReadinessProbe,
    ReferenceRepository, SortDir, SpatialRepository, TrackPointSortKey, UnifiedFilter,
    UnifiedRepository,
};

fn ts(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
}

fn date(y: i32, mo: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, mo, d).unwrap()
}

/// Base point the spatial fixtures cluster around
pub const BASE_LAT: f64 = 47.0;
pub const BASE_LON: f64 = 8.0;

fn location(
    id: i64,
    device_id: &str,
    lat: f64,
    lon: f64,
    timestamp: DateTime<Utc>,
    battery: Option<i32>,
) -> Location {
    Location {
        id,
        device_id: device_id.to_string(),
        tid: Some(device_id[..2].to_uppercase()),
        latitude: lat,
        longitude: lon,
        accuracy: Some(5),
        altitude: Some(430.0),
        velocity: Some(0),
        battery,
        battery_status: Some(1),
        connection_type: Some("w".to_string()),
        trigger: Some("t".to_string()),
        timestamp,
        created_at: Some(timestamp),
    }
}

/// Five points: three on the phone near the base coordinate (at ~0 m, ~111 m,
/// and ~1113 m) and two far-away tablet points. Point 5 arrived a day after
/// it was captured, so ingestion-time date filters see it on Nov 11.
pub fn seed_locations() -> Vec<Location> {
    let mut rows = vec![
        location(1, "phone", BASE_LAT, BASE_LON, ts(2025, 11, 1, 8, 0, 0), Some(90)),
        location(2, "phone", BASE_LAT + 0.001, BASE_LON, ts(2025, 11, 1, 9, 0, 0), Some(85)),
        location(3, "phone", BASE_LAT + 0.01, BASE_LON, ts(2025, 11, 2, 10, 0, 0), Some(80)),
        location(4, "tablet", 47.5, 8.5, ts(2025, 11, 3, 11, 0, 0), Some(60)),
        location(5, "tablet", 46.0, 7.0, ts(2025, 11, 10, 12, 0, 0), None),
    ];
    rows[4].created_at = Some(ts(2025, 11, 11, 6, 0, 0));
    rows
}

fn activity(
    activity_id: &str,
    sport: &str,
    start: DateTime<Utc>,
    distance_km: f64,
) -> Activity {
    Activity {
        activity_id: activity_id.to_string(),
        sport: sport.to_string(),
        sub_sport: None,
        start_time: Some(start),
        end_time: Some(start + chrono::Duration::hours(2)),
        distance_km: Some(distance_km),
        duration_seconds: Some(7200),
        avg_heart_rate: Some(132),
        max_heart_rate: Some(171),
        avg_cadence: Some(80),
        max_cadence: Some(105),
        calories: Some(900),
        avg_speed_kmh: Some(distance_km / 2.0),
        max_speed_kmh: Some(48.0),
        total_ascent_m: Some(420),
        total_descent_m: Some(415),
        total_distance: Some(distance_km),
        avg_pace: None,
        device_manufacturer: Some("garmin".to_string()),
        avg_temperature_c: Some(18),
        min_temperature_c: Some(12),
        max_temperature_c: Some(24),
        total_elapsed_time: Some(7300.0),
        total_timer_time: Some(7200.0),
        created_at: Some(start),
        uploaded_at: Some(start + chrono::Duration::hours(3)),
        track_point_count: None,
    }
}

pub fn seed_activities() -> Vec<Activity> {
    vec![
        activity("act-1", "cycling", ts(2025, 6, 1, 10, 0, 0), 42.5),
        activity("act-2", "cycling", ts(2025, 6, 5, 9, 0, 0), 61.0),
        activity("act-3", "running", ts(2025, 7, 1, 7, 0, 0), 10.2),
    ]
}

fn track_point(
    id: i64,
    activity_id: &str,
    lat: f64,
    lon: f64,
    timestamp: DateTime<Utc>,
) -> TrackPoint {
    TrackPoint {
        id,
        activity_id: activity_id.to_string(),
        latitude: lat,
        longitude: lon,
        timestamp,
        altitude: Some(430.0),
        distance_from_start_km: Some(0.1 * id as f64),
        speed_kmh: Some(25.0),
        heart_rate: Some(130),
        cadence: Some(82),
        temperature_c: Some(18),
        created_at: Some(timestamp),
    }
}

/// Track points for act-1; ids 1 and 2 share a timestamp and id 1 lacks an
/// altitude, so deduplicated reads must keep id 2 and report three distinct
/// instants.
pub fn seed_track_points() -> Vec<TrackPoint> {
    let t0 = ts(2025, 6, 1, 10, 0, 0);
    let mut rows = vec![
        track_point(1, "act-1", BASE_LAT, BASE_LON, t0),
        track_point(2, "act-1", BASE_LAT + 0.0001, BASE_LON, t0),
        track_point(3, "act-1", BASE_LAT + 0.0005, BASE_LON, t0 + chrono::Duration::seconds(1)),
        track_point(4, "act-1", BASE_LAT + 0.002, BASE_LON, t0 + chrono::Duration::seconds(2)),
    ];
    rows[0].altitude = None;
    rows
}

pub fn seed_references() -> Vec<ReferenceLocation> {
    vec![ReferenceLocation {
        id: 1,
        name: "home".to_string(),
        latitude: BASE_LAT,
        longitude: BASE_LON,
        radius_meters: 200.0,
        description: Some("base".to_string()),
        created_at: Some(ts(2025, 1, 1, 0, 0, 0)),
        updated_at: None,
    }]
}

pub fn seed_unified() -> Vec<UnifiedGpsPoint> {
    seed_locations()
        .into_iter()
        .map(|l| UnifiedGpsPoint {
            source: PointSource::Owntracks,
            identifier: l.device_id,
            latitude: l.latitude,
            longitude: l.longitude,
            timestamp: l.timestamp,
            accuracy: l.accuracy,
            battery: l.battery,
            speed_kmh: None,
            heart_rate: None,
            created_at: l.created_at,
        })
        .chain(seed_track_points().into_iter().map(|p| UnifiedGpsPoint {
            source: PointSource::Garmin,
            identifier: p.activity_id,
            latitude: p.latitude,
            longitude: p.longitude,
            timestamp: p.timestamp,
            accuracy: None,
            battery: None,
            speed_kmh: p.speed_kmh,
            heart_rate: p.heart_rate,
            created_at: p.created_at,
        }))
        .collect()
}

pub fn seed_daily_summaries() -> Vec<DailySummary> {
    vec![
        DailySummary {
            activity_date: Some(date(2025, 11, 1)),
            owntracks_device: Some("phone".to_string()),
            owntracks_points: Some(2),
            min_battery: Some(85),
            max_battery: Some(90),
            avg_accuracy: Some(5.0),
            garmin_sport: None,
            garmin_activities: None,
            total_distance_km: None,
            total_duration_seconds: None,
            avg_heart_rate: None,
            total_calories: None,
        },
        DailySummary {
            activity_date: Some(date(2025, 11, 2)),
            owntracks_device: Some("phone".to_string()),
            owntracks_points: Some(1),
            min_battery: Some(80),
            max_battery: Some(80),
            avg_accuracy: Some(5.0),
            garmin_sport: Some("cycling".to_string()),
            garmin_activities: Some(1),
            total_distance_km: Some(42.5),
            total_duration_seconds: Some(7200),
            avg_heart_rate: Some(132.0),
            total_calories: Some(900),
        },
    ]
}

fn paginate<T: Clone>(items: &[T], page: PageParams) -> Page<T> {
    let total = items.len() as i64;
    let start = (page.offset.max(0) as usize).min(items.len());
    let end = (start + page.limit.max(0) as usize).min(items.len());
    Page::new(items[start..end].to_vec(), total, page.limit, page.offset)
}

fn cmp_f64(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

fn directed(ordering: Ordering, direction: SortDir) -> Ordering {
    match direction {
        SortDir::Asc => ordering,
        SortDir::Desc => ordering.reverse(),
    }
}

// ---------------------------------------------------------------------------
// Locations
// ---------------------------------------------------------------------------

pub struct FakeLocationRepository {
    rows: Vec<Location>,
}

impl FakeLocationRepository {
    pub fn seeded() -> Self {
        Self {
            rows: seed_locations(),
        }
    }
}

#[async_trait]
impl LocationRepository for FakeLocationRepository {
    async fn list(
        &self,
        filter: LocationFilter,
        sort: LocationSortKey,
        direction: SortDir,
        page: PageParams,
    ) -> DbResult<Page<Location>> {
        let mut rows: Vec<Location> = self
            .rows
            .iter()
            .filter(|l| {
                filter
                    .device_id
                    .as_ref()
                    .map_or(true, |d| &l.device_id == d)
                    && filter.date_from.map_or(true, |from| {
                        l.created_at.map_or(false, |c| c.date_naive() >= from)
                    })
                    && filter.date_to.map_or(true, |to| {
                        l.created_at.map_or(false, |c| c.date_naive() <= to)
                    })
            })
            .cloned()
            .collect();

        rows.sort_by(|a, b| {
            let key = match sort {
                LocationSortKey::Id => a.id.cmp(&b.id),
                LocationSortKey::DeviceId => a.device_id.cmp(&b.device_id),
                LocationSortKey::Timestamp => a.timestamp.cmp(&b.timestamp),
                LocationSortKey::CreatedAt => a.created_at.cmp(&b.created_at),
                LocationSortKey::Battery => a.battery.cmp(&b.battery),
                LocationSortKey::Accuracy => a.accuracy.cmp(&b.accuracy),
            };
            directed(key.then(a.id.cmp(&b.id)), direction)
        });

        Ok(paginate(&rows, page))
    }

    async fn get(&self, id: i64) -> DbResult<Option<LocationDetail>> {
        Ok(self.rows.iter().find(|l| l.id == id).map(|l| LocationDetail {
            location: l.clone(),
            raw_payload: Some(serde_json::json!({
                "_type": "location",
                "tid": l.tid,
                "lat": l.latitude,
                "lon": l.longitude,
            })),
        }))
    }

    async fn devices(&self) -> DbResult<Vec<String>> {
        let mut devices: Vec<String> = self.rows.iter().map(|l| l.device_id.clone()).collect();
        devices.sort();
        devices.dedup();
        Ok(devices)
    }

    async fn count(
        &self,
        date: Option<NaiveDate>,
        device_id: Option<String>,
    ) -> DbResult<LocationCount> {
        let count = self
            .rows
            .iter()
            .filter(|l| {
                date.map_or(true, |d| {
                    l.created_at.map_or(false, |c| c.date_naive() == d)
                }) && device_id.as_ref().map_or(true, |dev| &l.device_id == dev)
            })
            .count() as i64;
        Ok(LocationCount {
            count,
            date,
            device_id,
        })
    }
}

// ---------------------------------------------------------------------------
// Activities
// ---------------------------------------------------------------------------

pub struct FakeActivityRepository {
    activities: Vec<Activity>,
    track_points: Vec<TrackPoint>,
}

impl FakeActivityRepository {
    pub fn seeded() -> Self {
        Self {
            activities: seed_activities(),
            track_points: seed_track_points(),
        }
    }

    fn require_activity(&self, activity_id: &str) -> DbResult<()> {
        if self.activities.iter().any(|a| a.activity_id == activity_id) {
            Ok(())
        } else {
            Err(DbError::NotFound(format!("activity '{activity_id}'")))
        }
    }

    /// One point per timestamp, ascending by time. Among duplicates the
    /// altitude-bearing row wins, then the highest id.
    fn deduped(&self, activity_id: &str) -> Vec<TrackPoint> {
        let mut points: Vec<TrackPoint> = self
            .track_points
            .iter()
            .filter(|p| p.activity_id == activity_id)
            .cloned()
            .collect();
        points.sort_by(|a, b| {
            a.timestamp
                .cmp(&b.timestamp)
                .then(b.altitude.is_some().cmp(&a.altitude.is_some()))
                .then(b.id.cmp(&a.id))
        });
        points.dedup_by_key(|p| p.timestamp);
        points
    }
}

#[async_trait]
impl ActivityRepository for FakeActivityRepository {
    async fn list(
        &self,
        filter: ActivityFilter,
        sort: ActivitySortKey,
        direction: SortDir,
        page: PageParams,
    ) -> DbResult<Page<Activity>> {
        let mut rows: Vec<Activity> = self
            .activities
            .iter()
            .filter(|a| {
                filter.sport.as_ref().map_or(true, |s| &a.sport == s)
                    && filter.date_from.map_or(true, |from| {
                        a.start_time.map_or(false, |t| t.date_naive() >= from)
                    })
                    && filter.date_to.map_or(true, |to| {
                        a.start_time.map_or(false, |t| t.date_naive() <= to)
                    })
            })
            .map(|a| {
                let mut row = a.clone();
                row.track_point_count = Some(self.deduped(&row.activity_id).len() as i64);
                row
            })
            .collect();

        rows.sort_by(|a, b| {
            let key = match sort {
                ActivitySortKey::StartTime => a.start_time.cmp(&b.start_time),
                ActivitySortKey::Sport => a.sport.cmp(&b.sport),
                ActivitySortKey::DistanceKm => {
                    cmp_f64(a.distance_km.unwrap_or(0.0), b.distance_km.unwrap_or(0.0))
                }
                ActivitySortKey::DurationSeconds => a.duration_seconds.cmp(&b.duration_seconds),
                ActivitySortKey::Calories => a.calories.cmp(&b.calories),
                ActivitySortKey::AvgHeartRate => a.avg_heart_rate.cmp(&b.avg_heart_rate),
                ActivitySortKey::CreatedAt => a.created_at.cmp(&b.created_at),
            };
            directed(key.then(a.activity_id.cmp(&b.activity_id)), direction)
        });

        Ok(paginate(&rows, page))
    }

    async fn get(&self, activity_id: &str) -> DbResult<Option<Activity>> {
        Ok(self
            .activities
            .iter()
            .find(|a| a.activity_id == activity_id)
            .map(|a| {
                let mut activity = a.clone();
                activity.track_point_count = Some(self.deduped(activity_id).len() as i64);
                activity
            }))
    }

    async fn sports(&self) -> DbResult<Vec<SportCount>> {
        let mut counts: Vec<SportCount> = Vec::new();
        for activity in &self.activities {
            match counts.iter_mut().find(|c| c.sport == activity.sport) {
                Some(entry) => entry.activity_count += 1,
                None => counts.push(SportCount {
                    sport: activity.sport.clone(),
                    activity_count: 1,
                }),
            }
        }
        counts.sort_by(|a, b| {
            b.activity_count
                .cmp(&a.activity_count)
                .then(a.sport.cmp(&b.sport))
        });
        Ok(counts)
    }

    async fn track_points(
        &self,
        activity_id: &str,
        sort: TrackPointSortKey,
        direction: SortDir,
        page: PageParams,
    ) -> DbResult<Page<TrackPoint>> {
        self.require_activity(activity_id)?;

        let mut points = self.deduped(activity_id);
        points.sort_by(|a, b| {
            let key = match sort {
                TrackPointSortKey::Timestamp => a.timestamp.cmp(&b.timestamp),
                TrackPointSortKey::Altitude => {
                    cmp_f64(a.altitude.unwrap_or(0.0), b.altitude.unwrap_or(0.0))
                }
                TrackPointSortKey::SpeedKmh => {
                    cmp_f64(a.speed_kmh.unwrap_or(0.0), b.speed_kmh.unwrap_or(0.0))
                }
                TrackPointSortKey::HeartRate => a.heart_rate.cmp(&b.heart_rate),
                TrackPointSortKey::CreatedAt => a.created_at.cmp(&b.created_at),
            };
            directed(key.then(a.id.cmp(&b.id)), direction)
        });

        Ok(paginate(&points, page))
    }

    async fn simplified_track(
        &self,
        activity_id: &str,
        tolerance: f64,
    ) -> DbResult<SimplifiedRoute> {
        if !tolerance.is_finite()
            || !(MIN_SIMPLIFY_TOLERANCE..=MAX_SIMPLIFY_TOLERANCE).contains(&tolerance)
        {
            return Err(DbError::Validation(format!(
                "tolerance out of range: {tolerance}"
            )));
        }
        self.require_activity(activity_id)?;

        let points: Vec<RoutePoint> = self
            .deduped(activity_id)
            .into_iter()
            .map(|p| RoutePoint {
                latitude: p.latitude,
                longitude: p.longitude,
            })
            .collect();

        Ok(SimplifiedRoute {
            activity_id: activity_id.to_string(),
            tolerance,
            point_count: points.len(),
            points,
        })
    }

    async fn chart_data(&self, activity_id: &str) -> DbResult<Vec<ChartPoint>> {
        self.require_activity(activity_id)?;
        Ok(self
            .deduped(activity_id)
            .into_iter()
            .map(|p| ChartPoint {
                latitude: p.latitude,
                longitude: p.longitude,
                timestamp: p.timestamp,
                altitude: p.altitude,
                distance_from_start_km: p.distance_from_start_km,
                speed_kmh: p.speed_kmh,
                heart_rate: p.heart_rate,
                cadence: p.cadence,
                temperature_c: p.temperature_c,
            })
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Reference locations
// ---------------------------------------------------------------------------

/// Reference rows shared between the reference repo and the spatial repo,
/// so a created geofence is immediately visible to within-reference queries.
#[derive(Clone)]
pub struct SharedReferences(Arc<Mutex<Vec<ReferenceLocation>>>);

impl SharedReferences {
    pub fn seeded() -> Self {
        Self(Arc::new(Mutex::new(seed_references())))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<ReferenceLocation>> {
        self.0.lock().expect("reference fixture lock")
    }
}

pub struct FakeReferenceRepository {
    references: SharedReferences,
}

impl FakeReferenceRepository {
    pub fn new(references: SharedReferences) -> Self {
        Self { references }
    }
}

#[async_trait]
impl ReferenceRepository for FakeReferenceRepository {
    async fn list(&self) -> DbResult<Vec<ReferenceLocation>> {
        let mut rows = self.references.lock().clone();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn get(&self, id: i64) -> DbResult<Option<ReferenceLocation>> {
        Ok(self.references.lock().iter().find(|r| r.id == id).cloned())
    }

    async fn create(&self, new: NewReferenceLocation) -> DbResult<ReferenceLocation> {
        new.validate()?;
        let mut rows = self.references.lock();
        if rows.iter().any(|r| r.name == new.name) {
            return Err(DbError::Conflict(format!(
                "reference location '{}' already exists",
                new.name
            )));
        }
        let id = rows.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        let created = ReferenceLocation {
            id,
            name: new.name,
            latitude: new.latitude,
            longitude: new.longitude,
            radius_meters: new.radius_meters,
            description: new.description,
            created_at: Some(Utc::now()),
            updated_at: None,
        };
        rows.push(created.clone());
        Ok(created)
    }

    async fn update(
        &self,
        id: i64,
        patch: ReferenceLocationPatch,
    ) -> DbResult<ReferenceLocation> {
        if patch.is_empty() {
            return Err(DbError::Validation(
                "update patch contains no fields".to_string(),
            ));
        }
        patch.validate()?;

        let mut rows = self.references.lock();
        let row = rows
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| DbError::NotFound(format!("reference location {id}")))?;

        if let Some(name) = patch.name {
            row.name = name;
        }
        if let Some(lat) = patch.latitude {
            row.latitude = lat;
        }
        if let Some(lon) = patch.longitude {
            row.longitude = lon;
        }
        if let Some(radius) = patch.radius_meters {
            row.radius_meters = radius;
        }
        if let Some(description) = patch.description {
            row.description = Some(description);
        }
        row.updated_at = Some(Utc::now());
        Ok(row.clone())
    }

    async fn delete(&self, id: i64) -> DbResult<()> {
        let mut rows = self.references.lock();
        let before = rows.len();
        rows.retain(|r| r.id != id);
        if rows.len() == before {
            return Err(DbError::NotFound(format!("reference location {id}")));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Spatial
// ---------------------------------------------------------------------------

pub struct FakeSpatialRepository {
    locations: Vec<Location>,
    track_points: Vec<TrackPoint>,
    references: SharedReferences,
}

impl FakeSpatialRepository {
    pub fn new(references: SharedReferences) -> Self {
        Self {
            locations: seed_locations(),
            track_points: seed_track_points(),
            references,
        }
    }

    /// Radius search without the client-radius cap; within-reference uses
    /// the stored geofence radius as-is.
    fn scan(&self, query: &NearbyQuery) -> DbResult<Vec<NearbyPoint>> {
        let mut points: Vec<NearbyPoint> = Vec::new();

        if query.source != Some(PointSource::Garmin) {
            for l in &self.locations {
                let p = GeoPoint::new(l.latitude, l.longitude)
                    .map_err(|e| DbError::Validation(e.to_string()))?;
                let d = query.center.haversine_distance_m(&p);
                if d <= query.radius_meters {
                    points.push(NearbyPoint {
                        source: PointSource::Owntracks,
                        id: l.id,
                        latitude: l.latitude,
                        longitude: l.longitude,
                        distance_meters: d,
                        timestamp: l.timestamp,
                    });
                }
            }
        }

        if query.source != Some(PointSource::Owntracks) {
            for t in &self.track_points {
                let p = GeoPoint::new(t.latitude, t.longitude)
                    .map_err(|e| DbError::Validation(e.to_string()))?;
                let d = query.center.haversine_distance_m(&p);
                if d <= query.radius_meters {
                    points.push(NearbyPoint {
                        source: PointSource::Garmin,
                        id: t.id,
                        latitude: t.latitude,
                        longitude: t.longitude,
                        distance_meters: d,
                        timestamp: t.timestamp,
                    });
                }
            }
        }

        points.sort_by(|a, b| cmp_f64(a.distance_meters, b.distance_meters));
        points.truncate(query.limit.max(0) as usize);
        Ok(points)
    }
}

#[async_trait]
impl SpatialRepository for FakeSpatialRepository {
    async fn nearby(&self, query: NearbyQuery) -> DbResult<Vec<NearbyPoint>> {
        if !query.radius_meters.is_finite()
            || query.radius_meters <= 0.0
            || query.radius_meters > MAX_RADIUS_METERS
        {
            return Err(DbError::Validation(format!(
                "radius out of range: {}",
                query.radius_meters
            )));
        }
        self.scan(&query)
    }

    async fn distance(&self, from: GeoPoint, to: GeoPoint) -> DbResult<f64> {
        Ok(from.haversine_distance_m(&to))
    }

    async fn within_reference(
        &self,
        name: &str,
        source: Option<PointSource>,
        limit: i64,
    ) -> DbResult<WithinReferenceResult> {
        let reference = self
            .references
            .lock()
            .iter()
            .find(|r| r.name == name)
            .cloned()
            .ok_or_else(|| DbError::NotFound(format!("reference location '{name}'")))?;

        let center = GeoPoint::new(reference.latitude, reference.longitude)
            .map_err(|e| DbError::Validation(e.to_string()))?;
        let points = self.scan(&NearbyQuery {
            center,
            radius_meters: reference.radius_meters,
            source,
            limit,
        })?;

        Ok(WithinReferenceResult {
            reference_name: name.to_string(),
            radius_meters: reference.radius_meters,
            total_points: points.len() as i64,
            points,
        })
    }
}

// ---------------------------------------------------------------------------
// Unified views
// ---------------------------------------------------------------------------

pub struct FakeUnifiedRepository {
    points: Vec<UnifiedGpsPoint>,
    summaries: Vec<DailySummary>,
}

impl FakeUnifiedRepository {
    pub fn seeded() -> Self {
        Self {
            points: seed_unified(),
            summaries: seed_daily_summaries(),
        }
    }
}

#[async_trait]
impl UnifiedRepository for FakeUnifiedRepository {
    async fn unified(
        &self,
        filter: UnifiedFilter,
        page: PageParams,
    ) -> DbResult<Page<UnifiedGpsPoint>> {
        let mut rows: Vec<UnifiedGpsPoint> = self
            .points
            .iter()
            .filter(|p| {
                filter.source.map_or(true, |s| p.source == s)
                    && filter
                        .date_from
                        .map_or(true, |from| p.timestamp.date_naive() >= from)
                    && filter
                        .date_to
                        .map_or(true, |to| p.timestamp.date_naive() <= to)
            })
            .cloned()
            .collect();

        rows.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then(b.identifier.cmp(&a.identifier))
        });
        Ok(paginate(&rows, page))
    }

    async fn daily_summary(
        &self,
        date_from: Option<NaiveDate>,
        date_to: Option<NaiveDate>,
        limit: i64,
    ) -> DbResult<Vec<DailySummary>> {
        let mut rows: Vec<DailySummary> = self
            .summaries
            .iter()
            .filter(|s| {
                date_from.map_or(true, |from| s.activity_date.map_or(false, |d| d >= from))
                    && date_to.map_or(true, |to| s.activity_date.map_or(false, |d| d <= to))
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.activity_date.cmp(&a.activity_date));
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }
}

// ---------------------------------------------------------------------------
// Readiness
// ---------------------------------------------------------------------------

pub struct FakeProbe;

#[async_trait]
impl ReadinessProbe for FakeProbe {
    async fn check(&self) -> DbResult<DbHealth> {
        Ok(DbHealth {
            version: "PostgreSQL 16.2 (fixture)".to_string(),
            server_time: Utc::now(),
            pool_size: 2,
            pool_idle: 2,
        })
    }
}

pub struct FailingProbe;

#[async_trait]
impl ReadinessProbe for FailingProbe {
    async fn check(&self) -> DbResult<DbHealth> {
        Err(DbError::Unavailable("connection refused".to_string()))
    }
}
