//! OwnTracks location point repository

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::postgres::PgRow;
use sqlx::Row;
use std::str::FromStr;
use tracing::instrument;

use tracklog_core::{Location, LocationCount, LocationDetail, Page};

use crate::error::{DbError, DbResult};
use crate::executor::{Executor, SqlArg, Statement};
use crate::query::{fetch_page, paged, OrderBy, PageParams, SortDir, WhereClause};

const COLUMNS: &str = "id, device_id, tid, latitude, longitude, accuracy, altitude, \
     velocity, battery, battery_status, connection_type, trigger, \
     timestamp, created_at";

const TABLE: &str = "public.locations";

const GET_BY_ID: Statement = Statement::fixed(
    "locations.get",
    "SELECT id, device_id, tid, latitude, longitude, accuracy, altitude, \
     velocity, battery, battery_status, connection_type, trigger, \
     timestamp, created_at, raw_payload \
     FROM public.locations WHERE id = $1",
);

const DEVICES: Statement = Statement::fixed(
    "locations.devices",
    "SELECT DISTINCT device_id FROM public.locations ORDER BY device_id",
);

/// Sortable columns for location listings.
///
/// Closed set: an unknown name is a client error, not a silent fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LocationSortKey {
    Id,
    DeviceId,
    Timestamp,
    #[default]
    CreatedAt,
    Battery,
    Accuracy,
}

impl LocationSortKey {
    fn column(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::DeviceId => "device_id",
            Self::Timestamp => "timestamp",
            Self::CreatedAt => "created_at",
            Self::Battery => "battery",
            Self::Accuracy => "accuracy",
        }
    }
}

impl FromStr for LocationSortKey {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "id" => Ok(Self::Id),
            "device_id" => Ok(Self::DeviceId),
            "timestamp" => Ok(Self::Timestamp),
            "created_at" => Ok(Self::CreatedAt),
            "battery" => Ok(Self::Battery),
            "accuracy" => Ok(Self::Accuracy),
            other => Err(DbError::InvalidFilter(format!(
                "unknown location sort key: {other}"
            ))),
        }
    }
}

/// Filters for location listings; omitted fields add no predicate.
///
/// Date filters apply to `created_at` (ingestion time), not the capture
/// timestamp: "points from yesterday" means points that arrived yesterday,
/// even when the device reported them late.
#[derive(Debug, Clone, Default)]
pub struct LocationFilter {
    pub device_id: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl LocationFilter {
    fn compile(&self) -> WhereClause {
        let mut wc = WhereClause::new();
        if let Some(device_id) = &self.device_id {
            wc.eq("device_id", SqlArg::Text(device_id.clone()));
        }
        if let Some(from) = self.date_from {
            wc.date_on_or_after("created_at", from);
        }
        if let Some(to) = self.date_to {
            wc.date_before_next_day("created_at", to);
        }
        wc
    }
}

fn from_row(row: &PgRow) -> DbResult<Location> {
    Ok(Location {
        id: row.try_get("id")?,
        device_id: row.try_get("device_id")?,
        tid: row.try_get("tid")?,
        latitude: row.try_get("latitude")?,
        longitude: row.try_get("longitude")?,
        accuracy: row.try_get("accuracy")?,
        altitude: row.try_get("altitude")?,
        velocity: row.try_get("velocity")?,
        battery: row.try_get("battery")?,
        battery_status: row.try_get("battery_status")?,
        connection_type: row.try_get("connection_type")?,
        trigger: row.try_get("trigger")?,
        timestamp: row.try_get("timestamp")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Read access to recorded location points
#[async_trait]
pub trait LocationRepository: Send + Sync {
    /// List locations matching the filter, newest-first by default
    async fn list(
        &self,
        filter: LocationFilter,
        sort: LocationSortKey,
        direction: SortDir,
        page: PageParams,
    ) -> DbResult<Page<Location>>;

    /// A single location with its raw ingestion payload
    async fn get(&self, id: i64) -> DbResult<Option<LocationDetail>>;

    /// Distinct device identifiers that have reported points
    async fn devices(&self) -> DbResult<Vec<String>>;

    /// Count points, optionally restricted to one day and/or one device
    async fn count(
        &self,
        date: Option<NaiveDate>,
        device_id: Option<String>,
    ) -> DbResult<LocationCount>;
}

/// PostgreSQL-backed location repository
#[derive(Debug, Clone)]
pub struct PgLocationRepository {
    executor: Executor,
}

impl PgLocationRepository {
    pub fn new(executor: Executor) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl LocationRepository for PgLocationRepository {
    #[instrument(skip(self))]
    async fn list(
        &self,
        filter: LocationFilter,
        sort: LocationSortKey,
        direction: SortDir,
        page: PageParams,
    ) -> DbResult<Page<Location>> {
        let pq = paged(
            "locations.list",
            COLUMNS,
            TABLE,
            filter.compile(),
            &OrderBy::new(sort.column(), direction, "id"),
            page,
        );
        fetch_page(&self.executor, pq, from_row).await
    }

    #[instrument(skip(self))]
    async fn get(&self, id: i64) -> DbResult<Option<LocationDetail>> {
        let row = self
            .executor
            .fetch_one(&GET_BY_ID, &[SqlArg::Int(id)])
            .await?;

        match row {
            Some(row) => Ok(Some(LocationDetail {
                location: from_row(&row)?,
                raw_payload: row.try_get("raw_payload")?,
            })),
            None => Ok(None),
        }
    }

    #[instrument(skip(self))]
    async fn devices(&self) -> DbResult<Vec<String>> {
        let rows = self.executor.fetch_all(&DEVICES, &[]).await?;
        rows.iter()
            .map(|row| row.try_get::<String, _>("device_id").map_err(DbError::from))
            .collect()
    }

    #[instrument(skip(self))]
    async fn count(
        &self,
        date: Option<NaiveDate>,
        device_id: Option<String>,
    ) -> DbResult<LocationCount> {
        let mut wc = WhereClause::new();
        if let Some(d) = date {
            wc.date_eq("created_at", d);
        }
        if let Some(device) = &device_id {
            wc.eq("device_id", SqlArg::Text(device.clone()));
        }

        let stmt = Statement::compiled(
            "locations.count",
            if wc.is_empty() {
                format!("SELECT COUNT(*) FROM {TABLE}")
            } else {
                format!("SELECT COUNT(*) FROM {TABLE} {}", wc.render())
            },
        );

        let count = self
            .executor
            .fetch_scalar::<i64>(&stmt, wc.args())
            .await?
            .unwrap_or(0);

        Ok(LocationCount {
            count,
            date,
            device_id,
        })
    }
}
