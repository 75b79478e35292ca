//! Garmin activity and track point repository
//!
//! Track point reads deduplicate on timestamp: the ingestion pipeline can
//! record the same instant more than once, and one row per instant is the
//! contract here. Among duplicates, a row carrying an altitude wins over one
//! without, then the highest id. The COUNT for paged track points is
//! therefore `COUNT(DISTINCT timestamp)`, matching what the page queries
//! return.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::postgres::PgRow;
use sqlx::Row;
use std::str::FromStr;
use tracing::instrument;

use tracklog_core::{Activity, ChartPoint, Page, RoutePoint, SimplifiedRoute, SportCount, TrackPoint};

use crate::error::{DbError, DbResult};
use crate::executor::{Executor, SqlArg, Statement};
use crate::query::{fetch_page, paged, OrderBy, PageParams, SortDir, WhereClause};

/// Smallest accepted ST_Simplify tolerance, in degrees
pub const MIN_SIMPLIFY_TOLERANCE: f64 = 0.000001;

/// Largest accepted ST_Simplify tolerance, in degrees (~1 km)
pub const MAX_SIMPLIFY_TOLERANCE: f64 = 0.01;

const ACTIVITY_COLUMNS: &str = "activity_id, sport, sub_sport, start_time, end_time, distance_km, \
     duration_seconds, avg_heart_rate, max_heart_rate, avg_cadence, max_cadence, \
     calories, avg_speed_kmh, max_speed_kmh, total_ascent_m, total_descent_m, \
     total_distance, avg_pace, device_manufacturer, avg_temperature_c, \
     min_temperature_c, max_temperature_c, total_elapsed_time, total_timer_time, \
     created_at, uploaded_at, \
     (SELECT COUNT(DISTINCT t.timestamp) FROM public.garmin_track_points t \
      WHERE t.activity_id = a.activity_id) AS track_point_count";

const ACTIVITY_TABLE: &str = "public.garmin_activities a";

const TRACK_POINT_COLUMNS: &str = "id, activity_id, latitude, longitude, timestamp, altitude, \
     distance_from_start_km, speed_kmh, heart_rate, cadence, temperature_c, created_at";

const ACTIVITY_EXISTS: Statement = Statement::fixed(
    "activities.exists",
    "SELECT 1 FROM public.garmin_activities WHERE activity_id = $1",
);

const GET_BY_ID: Statement = Statement::fixed(
    "activities.get",
    "SELECT activity_id, sport, sub_sport, start_time, end_time, distance_km, \
     duration_seconds, avg_heart_rate, max_heart_rate, avg_cadence, max_cadence, \
     calories, avg_speed_kmh, max_speed_kmh, total_ascent_m, total_descent_m, \
     total_distance, avg_pace, device_manufacturer, avg_temperature_c, \
     min_temperature_c, max_temperature_c, total_elapsed_time, total_timer_time, \
     created_at, uploaded_at, \
     (SELECT COUNT(DISTINCT t.timestamp) FROM public.garmin_track_points t \
      WHERE t.activity_id = a.activity_id) AS track_point_count \
     FROM public.garmin_activities a WHERE activity_id = $1",
);

const SPORTS: Statement = Statement::fixed(
    "activities.sports",
    "SELECT sport, COUNT(*) AS activity_count \
     FROM public.garmin_activities \
     GROUP BY sport ORDER BY activity_count DESC, sport ASC",
);

const TRACK_POINT_COUNT: Statement = Statement::fixed(
    "activities.track_point_count",
    "SELECT COUNT(DISTINCT timestamp) FROM public.garmin_track_points \
     WHERE activity_id = $1",
);

const CHART_DATA: Statement = Statement::fixed(
    "activities.chart_data",
    "SELECT DISTINCT ON (timestamp) latitude, longitude, timestamp, altitude, \
     distance_from_start_km, speed_kmh, heart_rate, cadence, temperature_c \
     FROM public.garmin_track_points \
     WHERE activity_id = $1 \
     ORDER BY timestamp ASC, (altitude IS NOT NULL) DESC, id DESC",
);

const SIMPLIFIED_ROUTE: Statement = Statement::fixed(
    "activities.simplified_route",
    "WITH dedup AS ( \
       SELECT DISTINCT ON (timestamp) latitude, longitude, timestamp \
       FROM public.garmin_track_points \
       WHERE activity_id = $1 \
       ORDER BY timestamp ASC, (altitude IS NOT NULL) DESC, id DESC \
     ), line AS ( \
       SELECT ST_Simplify( \
         ST_MakeLine(ST_MakePoint(longitude, latitude) ORDER BY timestamp), $2 \
       ) AS geom FROM dedup \
     ) \
     SELECT ST_Y((dp).geom) AS latitude, ST_X((dp).geom) AS longitude \
     FROM line, LATERAL ST_DumpPoints(line.geom) AS dp \
     WHERE line.geom IS NOT NULL",
);

/// Sortable columns for activity listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActivitySortKey {
    #[default]
    StartTime,
    Sport,
    DistanceKm,
    DurationSeconds,
    Calories,
    AvgHeartRate,
    CreatedAt,
}

impl ActivitySortKey {
    fn column(self) -> &'static str {
        match self {
            Self::StartTime => "start_time",
            Self::Sport => "sport",
            Self::DistanceKm => "distance_km",
            Self::DurationSeconds => "duration_seconds",
            Self::Calories => "calories",
            Self::AvgHeartRate => "avg_heart_rate",
            Self::CreatedAt => "created_at",
        }
    }
}

impl FromStr for ActivitySortKey {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start_time" => Ok(Self::StartTime),
            "sport" => Ok(Self::Sport),
            "distance_km" => Ok(Self::DistanceKm),
            "duration_seconds" => Ok(Self::DurationSeconds),
            "calories" => Ok(Self::Calories),
            "avg_heart_rate" => Ok(Self::AvgHeartRate),
            "created_at" => Ok(Self::CreatedAt),
            other => Err(DbError::InvalidFilter(format!(
                "unknown activity sort key: {other}"
            ))),
        }
    }
}

/// Sortable columns for track point pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackPointSortKey {
    #[default]
    Timestamp,
    Altitude,
    SpeedKmh,
    HeartRate,
    CreatedAt,
}

impl TrackPointSortKey {
    fn column(self) -> &'static str {
        match self {
            Self::Timestamp => "timestamp",
            Self::Altitude => "altitude",
            Self::SpeedKmh => "speed_kmh",
            Self::HeartRate => "heart_rate",
            Self::CreatedAt => "created_at",
        }
    }
}

impl FromStr for TrackPointSortKey {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "timestamp" => Ok(Self::Timestamp),
            "altitude" => Ok(Self::Altitude),
            "speed_kmh" => Ok(Self::SpeedKmh),
            "heart_rate" => Ok(Self::HeartRate),
            "created_at" => Ok(Self::CreatedAt),
            other => Err(DbError::InvalidFilter(format!(
                "unknown track point sort key: {other}"
            ))),
        }
    }
}

/// Filters for activity listings; omitted fields add no predicate
#[derive(Debug, Clone, Default)]
pub struct ActivityFilter {
    pub sport: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl ActivityFilter {
    fn compile(&self) -> WhereClause {
        let mut wc = WhereClause::new();
        if let Some(sport) = &self.sport {
            wc.eq("sport", SqlArg::Text(sport.clone()));
        }
        if let Some(from) = self.date_from {
            wc.date_on_or_after("start_time", from);
        }
        if let Some(to) = self.date_to {
            wc.date_before_next_day("start_time", to);
        }
        wc
    }
}

fn activity_from_row(row: &PgRow) -> DbResult<Activity> {
    Ok(Activity {
        activity_id: row.try_get("activity_id")?,
        sport: row.try_get("sport")?,
        sub_sport: row.try_get("sub_sport")?,
        start_time: row.try_get("start_time")?,
        end_time: row.try_get("end_time")?,
        distance_km: row.try_get("distance_km")?,
        duration_seconds: row.try_get("duration_seconds")?,
        avg_heart_rate: row.try_get("avg_heart_rate")?,
        max_heart_rate: row.try_get("max_heart_rate")?,
        avg_cadence: row.try_get("avg_cadence")?,
        max_cadence: row.try_get("max_cadence")?,
        calories: row.try_get("calories")?,
        avg_speed_kmh: row.try_get("avg_speed_kmh")?,
        max_speed_kmh: row.try_get("max_speed_kmh")?,
        total_ascent_m: row.try_get("total_ascent_m")?,
        total_descent_m: row.try_get("total_descent_m")?,
        total_distance: row.try_get("total_distance")?,
        avg_pace: row.try_get("avg_pace")?,
        device_manufacturer: row.try_get("device_manufacturer")?,
        avg_temperature_c: row.try_get("avg_temperature_c")?,
        min_temperature_c: row.try_get("min_temperature_c")?,
        max_temperature_c: row.try_get("max_temperature_c")?,
        total_elapsed_time: row.try_get("total_elapsed_time")?,
        total_timer_time: row.try_get("total_timer_time")?,
        created_at: row.try_get("created_at")?,
        uploaded_at: row.try_get("uploaded_at")?,
        track_point_count: row.try_get("track_point_count")?,
    })
}

fn track_point_from_row(row: &PgRow) -> DbResult<TrackPoint> {
    Ok(TrackPoint {
        id: row.try_get("id")?,
        activity_id: row.try_get("activity_id")?,
        latitude: row.try_get("latitude")?,
        longitude: row.try_get("longitude")?,
        timestamp: row.try_get("timestamp")?,
        altitude: row.try_get("altitude")?,
        distance_from_start_km: row.try_get("distance_from_start_km")?,
        speed_kmh: row.try_get("speed_kmh")?,
        heart_rate: row.try_get("heart_rate")?,
        cadence: row.try_get("cadence")?,
        temperature_c: row.try_get("temperature_c")?,
        created_at: row.try_get("created_at")?,
    })
}

fn chart_point_from_row(row: &PgRow) -> DbResult<ChartPoint> {
    Ok(ChartPoint {
        latitude: row.try_get("latitude")?,
        longitude: row.try_get("longitude")?,
        timestamp: row.try_get("timestamp")?,
        altitude: row.try_get("altitude")?,
        distance_from_start_km: row.try_get("distance_from_start_km")?,
        speed_kmh: row.try_get("speed_kmh")?,
        heart_rate: row.try_get("heart_rate")?,
        cadence: row.try_get("cadence")?,
        temperature_c: row.try_get("temperature_c")?,
    })
}

/// Compile the deduplicated, paged track point statement.
///
/// Sort column and direction come from closed enums, never from the caller's
/// string, so the interpolation cannot carry SQL.
fn track_points_statement(sort: TrackPointSortKey, direction: SortDir) -> Statement {
    let order = OrderBy::new(sort.column(), direction, "id");
    Statement::compiled(
        "activities.track_points",
        format!(
            "WITH ranked AS ( \
               SELECT {TRACK_POINT_COLUMNS}, \
               ROW_NUMBER() OVER (PARTITION BY timestamp \
               ORDER BY (altitude IS NOT NULL) DESC, id DESC) AS rn \
               FROM public.garmin_track_points WHERE activity_id = $1 \
             ) \
             SELECT {TRACK_POINT_COLUMNS} FROM ranked WHERE rn = 1 \
             {} LIMIT $2 OFFSET $3",
            order.render()
        ),
    )
}

/// Read access to activities and their track points
#[async_trait]
pub trait ActivityRepository: Send + Sync {
    /// List activities matching the filter
    async fn list(
        &self,
        filter: ActivityFilter,
        sort: ActivitySortKey,
        direction: SortDir,
        page: PageParams,
    ) -> DbResult<Page<Activity>>;

    /// A single activity with its distinct track point count
    async fn get(&self, activity_id: &str) -> DbResult<Option<Activity>>;

    /// Distinct sports with activity counts, most frequent first
    async fn sports(&self) -> DbResult<Vec<SportCount>>;

    /// Paged, timestamp-deduplicated track points; `NotFound` for an unknown
    /// activity (distinguishing it from an activity with no points)
    async fn track_points(
        &self,
        activity_id: &str,
        sort: TrackPointSortKey,
        direction: SortDir,
        page: PageParams,
    ) -> DbResult<Page<TrackPoint>>;

    /// The whole route reduced with Douglas-Peucker at the given tolerance
    async fn simplified_track(
        &self,
        activity_id: &str,
        tolerance: f64,
    ) -> DbResult<SimplifiedRoute>;

    /// Full deduplicated time series for chart rendering
    async fn chart_data(&self, activity_id: &str) -> DbResult<Vec<ChartPoint>>;
}

/// PostgreSQL-backed activity repository
#[derive(Debug, Clone)]
pub struct PgActivityRepository {
    executor: Executor,
}

impl PgActivityRepository {
    pub fn new(executor: Executor) -> Self {
        Self { executor }
    }

    async fn require_activity(&self, activity_id: &str) -> DbResult<()> {
        let row = self
            .executor
            .fetch_one(&ACTIVITY_EXISTS, &[SqlArg::Text(activity_id.to_string())])
            .await?;
        match row {
            Some(_) => Ok(()),
            None => Err(DbError::NotFound(format!("activity '{activity_id}'"))),
        }
    }
}

#[async_trait]
impl ActivityRepository for PgActivityRepository {
    #[instrument(skip(self))]
    async fn list(
        &self,
        filter: ActivityFilter,
        sort: ActivitySortKey,
        direction: SortDir,
        page: PageParams,
    ) -> DbResult<Page<Activity>> {
        let pq = paged(
            "activities.list",
            ACTIVITY_COLUMNS,
            ACTIVITY_TABLE,
            filter.compile(),
            &OrderBy::new(sort.column(), direction, "activity_id"),
            page,
        );
        fetch_page(&self.executor, pq, activity_from_row).await
    }

    #[instrument(skip(self))]
    async fn get(&self, activity_id: &str) -> DbResult<Option<Activity>> {
        let row = self
            .executor
            .fetch_one(&GET_BY_ID, &[SqlArg::Text(activity_id.to_string())])
            .await?;
        row.as_ref().map(activity_from_row).transpose()
    }

    #[instrument(skip(self))]
    async fn sports(&self) -> DbResult<Vec<SportCount>> {
        let rows = self.executor.fetch_all(&SPORTS, &[]).await?;
        rows.iter()
            .map(|row| {
                Ok(SportCount {
                    sport: row.try_get("sport")?,
                    activity_count: row.try_get("activity_count")?,
                })
            })
            .collect()
    }

    #[instrument(skip(self))]
    async fn track_points(
        &self,
        activity_id: &str,
        sort: TrackPointSortKey,
        direction: SortDir,
        page: PageParams,
    ) -> DbResult<Page<TrackPoint>> {
        self.require_activity(activity_id).await?;

        let id_arg = SqlArg::Text(activity_id.to_string());
        let total = self
            .executor
            .fetch_scalar::<i64>(&TRACK_POINT_COUNT, std::slice::from_ref(&id_arg))
            .await?
            .unwrap_or(0);

        let stmt = track_points_statement(sort, direction);
        let args = vec![id_arg, SqlArg::Int(page.limit), SqlArg::Int(page.offset)];
        let rows = self.executor.fetch_all(&stmt, &args).await?;
        let items = rows
            .iter()
            .map(track_point_from_row)
            .collect::<DbResult<Vec<_>>>()?;

        Ok(Page::new(items, total, page.limit, page.offset))
    }

    #[instrument(skip(self))]
    async fn simplified_track(
        &self,
        activity_id: &str,
        tolerance: f64,
    ) -> DbResult<SimplifiedRoute> {
        if !tolerance.is_finite()
            || !(MIN_SIMPLIFY_TOLERANCE..=MAX_SIMPLIFY_TOLERANCE).contains(&tolerance)
        {
            return Err(DbError::Validation(format!(
                "tolerance must be between {MIN_SIMPLIFY_TOLERANCE} and \
                 {MAX_SIMPLIFY_TOLERANCE} degrees, got {tolerance}"
            )));
        }

        self.require_activity(activity_id).await?;

        let args = vec![
            SqlArg::Text(activity_id.to_string()),
            SqlArg::Float(tolerance),
        ];
        let rows = self.executor.fetch_all(&SIMPLIFIED_ROUTE, &args).await?;
        let points = rows
            .iter()
            .map(|row| {
                Ok(RoutePoint {
                    latitude: row.try_get("latitude")?,
                    longitude: row.try_get("longitude")?,
                })
            })
            .collect::<DbResult<Vec<_>>>()?;

        Ok(SimplifiedRoute {
            activity_id: activity_id.to_string(),
            tolerance,
            point_count: points.len(),
            points,
        })
    }

    #[instrument(skip(self))]
    async fn chart_data(&self, activity_id: &str) -> DbResult<Vec<ChartPoint>> {
        self.require_activity(activity_id).await?;

        let rows = self
            .executor
            .fetch_all(&CHART_DATA, &[SqlArg::Text(activity_id.to_string())])
            .await?;
        rows.iter().map(chart_point_from_row).collect()
    }
}
