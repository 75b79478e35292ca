//! Unified GPS view and daily summary repository
//!
//! Both backing views are pre-joined by the migration process; this module
//! only filters and pages them.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::postgres::PgRow;
use sqlx::Row;
use tracing::instrument;

use tracklog_core::{DailySummary, Page, PointSource, UnifiedGpsPoint};

use crate::error::{DbError, DbResult};
use crate::executor::{Executor, SqlArg, Statement};
use crate::query::{fetch_page, paged, OrderBy, PageParams, SortDir, WhereClause};

const COLUMNS: &str = "source, identifier, latitude, longitude, timestamp, accuracy, \
     battery, speed_kmh, heart_rate, created_at";

const VIEW: &str = "public.unified_gps_points";

const SUMMARY_COLUMNS: &str = "activity_date, owntracks_device, owntracks_points, min_battery, \
     max_battery, avg_accuracy, garmin_sport, garmin_activities, \
     total_distance_km, total_duration_seconds, avg_heart_rate, total_calories";

/// Filters for the unified GPS stream; omitted fields add no predicate
#[derive(Debug, Clone, Default)]
pub struct UnifiedFilter {
    pub source: Option<PointSource>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl UnifiedFilter {
    fn compile(&self) -> WhereClause {
        let mut wc = WhereClause::new();
        if let Some(source) = self.source {
            wc.eq("source", SqlArg::Text(source.to_string()));
        }
        if let Some(from) = self.date_from {
            wc.date_on_or_after("timestamp", from);
        }
        if let Some(to) = self.date_to {
            wc.date_before_next_day("timestamp", to);
        }
        wc
    }
}

fn from_row(row: &PgRow) -> DbResult<UnifiedGpsPoint> {
    let source: String = row.try_get("source")?;
    let source = source.parse::<PointSource>().map_err(DbError::Mapping)?;
    Ok(UnifiedGpsPoint {
        source,
        identifier: row.try_get("identifier")?,
        latitude: row.try_get("latitude")?,
        longitude: row.try_get("longitude")?,
        timestamp: row.try_get("timestamp")?,
        accuracy: row.try_get("accuracy")?,
        battery: row.try_get("battery")?,
        speed_kmh: row.try_get("speed_kmh")?,
        heart_rate: row.try_get("heart_rate")?,
        created_at: row.try_get("created_at")?,
    })
}

fn summary_from_row(row: &PgRow) -> DbResult<DailySummary> {
    Ok(DailySummary {
        activity_date: row.try_get("activity_date")?,
        owntracks_device: row.try_get("owntracks_device")?,
        owntracks_points: row.try_get("owntracks_points")?,
        min_battery: row.try_get("min_battery")?,
        max_battery: row.try_get("max_battery")?,
        avg_accuracy: row.try_get("avg_accuracy")?,
        garmin_sport: row.try_get("garmin_sport")?,
        garmin_activities: row.try_get("garmin_activities")?,
        total_distance_km: row.try_get("total_distance_km")?,
        total_duration_seconds: row.try_get("total_duration_seconds")?,
        avg_heart_rate: row.try_get("avg_heart_rate")?,
        total_calories: row.try_get("total_calories")?,
    })
}

/// Read access to the unified views
#[async_trait]
pub trait UnifiedRepository: Send + Sync {
    /// Page through the merged GPS stream, newest first
    async fn unified(
        &self,
        filter: UnifiedFilter,
        page: PageParams,
    ) -> DbResult<Page<UnifiedGpsPoint>>;

    /// Per-day aggregates, most recent days first
    async fn daily_summary(
        &self,
        date_from: Option<NaiveDate>,
        date_to: Option<NaiveDate>,
        limit: i64,
    ) -> DbResult<Vec<DailySummary>>;
}

/// PostgreSQL-backed unified view repository
#[derive(Debug, Clone)]
pub struct PgUnifiedRepository {
    executor: Executor,
}

impl PgUnifiedRepository {
    pub fn new(executor: Executor) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl UnifiedRepository for PgUnifiedRepository {
    #[instrument(skip(self))]
    async fn unified(
        &self,
        filter: UnifiedFilter,
        page: PageParams,
    ) -> DbResult<Page<UnifiedGpsPoint>> {
        let pq = paged(
            "unified.list",
            COLUMNS,
            VIEW,
            filter.compile(),
            &OrderBy::new("timestamp", SortDir::Desc, "identifier"),
            page,
        );
        fetch_page(&self.executor, pq, from_row).await
    }

    #[instrument(skip(self))]
    async fn daily_summary(
        &self,
        date_from: Option<NaiveDate>,
        date_to: Option<NaiveDate>,
        limit: i64,
    ) -> DbResult<Vec<DailySummary>> {
        let mut wc = WhereClause::new();
        if let Some(from) = date_from {
            wc.gte("activity_date", SqlArg::Date(from));
        }
        if let Some(to) = date_to {
            wc.lte("activity_date", SqlArg::Date(to));
        }

        let n = wc.args().len();
        let sql = if wc.is_empty() {
            format!(
                "SELECT {SUMMARY_COLUMNS} FROM public.daily_activity_summary \
                 ORDER BY activity_date DESC LIMIT ${}",
                n + 1
            )
        } else {
            format!(
                "SELECT {SUMMARY_COLUMNS} FROM public.daily_activity_summary {} \
                 ORDER BY activity_date DESC LIMIT ${}",
                wc.render(),
                n + 1
            )
        };
        let stmt = Statement::compiled("unified.daily_summary", sql);

        let mut args = wc.args().to_vec();
        args.push(SqlArg::Int(limit));

        let rows = self.executor.fetch_all(&stmt, &args).await?;
        rows.iter().map(summary_from_row).collect()
    }
}
