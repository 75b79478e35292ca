//! Spatial predicate builder
//!
//! PostGIS radius searches and distance computations over the two GPS point
//! tables. This module is the single reconciliation point for coordinate
//! order: PostGIS `ST_MakePoint` takes longitude first, while the rest of the
//! workspace speaks latitude-first. Every binding of a center point happens
//! here, in `nearby_args` and the distance statement, and nowhere else.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::Row;
use tracing::instrument;

use tracklog_core::{GeoPoint, NearbyPoint, PointSource, WithinReferenceResult};

use crate::error::{DbError, DbResult};
use crate::executor::{Executor, SqlArg, Statement};

/// Largest accepted search radius, in meters (100 km)
pub const MAX_RADIUS_METERS: f64 = 100_000.0;

/// A radius search around a center point
#[derive(Debug, Clone)]
pub struct NearbyQuery {
    pub center: GeoPoint,
    pub radius_meters: f64,
    /// Restrict to one dataset; `None` searches both
    pub source: Option<PointSource>,
    pub limit: i64,
}

impl NearbyQuery {
    fn validate(&self) -> DbResult<()> {
        if !self.radius_meters.is_finite() || self.radius_meters <= 0.0 {
            return Err(DbError::Validation(format!(
                "radius must be positive, got {}",
                self.radius_meters
            )));
        }
        if self.radius_meters > MAX_RADIUS_METERS {
            return Err(DbError::Validation(format!(
                "radius {} exceeds maximum of {MAX_RADIUS_METERS} meters",
                self.radius_meters
            )));
        }
        Ok(())
    }
}

const NEARBY_LOCATIONS: &str = "SELECT 'owntracks' AS source, id, latitude, longitude, \
     ST_Distance(geog, ST_MakePoint($1, $2)::geography) AS distance_meters, \
     timestamp \
     FROM public.locations \
     WHERE geog IS NOT NULL \
     AND ST_DWithin(geog, ST_MakePoint($1, $2)::geography, $3)";

const NEARBY_TRACK_POINTS: &str = "SELECT 'garmin' AS source, id, latitude, longitude, \
     ST_Distance(geog, ST_MakePoint($1, $2)::geography) AS distance_meters, \
     timestamp \
     FROM public.garmin_track_points \
     WHERE geog IS NOT NULL \
     AND ST_DWithin(geog, ST_MakePoint($1, $2)::geography, $3)";

/// Compile the nearby statement for the requested dataset(s)
fn nearby_statement(source: Option<PointSource>) -> Statement {
    let body = match source {
        Some(PointSource::Owntracks) => NEARBY_LOCATIONS.to_string(),
        Some(PointSource::Garmin) => NEARBY_TRACK_POINTS.to_string(),
        None => format!("({NEARBY_LOCATIONS}) UNION ALL ({NEARBY_TRACK_POINTS})"),
    };
    Statement::compiled(
        "spatial.nearby",
        format!("{body} ORDER BY distance_meters ASC LIMIT $4"),
    )
}

/// Bind a center point and radius: longitude first, then latitude.
fn nearby_args(center: GeoPoint, radius_meters: f64, limit: i64) -> Vec<SqlArg> {
    vec![
        SqlArg::Float(center.longitude()),
        SqlArg::Float(center.latitude()),
        SqlArg::Float(radius_meters),
        SqlArg::Int(limit),
    ]
}

const DISTANCE: Statement = Statement::fixed(
    "spatial.distance",
    "SELECT ST_Distance(ST_MakePoint($1, $2)::geography, \
     ST_MakePoint($3, $4)::geography)",
);

const REFERENCE_LOOKUP: Statement = Statement::fixed(
    "spatial.reference_lookup",
    "SELECT latitude, longitude, radius_meters \
     FROM public.reference_locations WHERE name = $1",
);

fn nearby_from_row(row: &PgRow) -> DbResult<NearbyPoint> {
    let source: String = row.try_get("source")?;
    let source = source
        .parse::<PointSource>()
        .map_err(DbError::Mapping)?;
    Ok(NearbyPoint {
        source,
        id: row.try_get("id")?,
        latitude: row.try_get("latitude")?,
        longitude: row.try_get("longitude")?,
        distance_meters: row.try_get("distance_meters")?,
        timestamp: row.try_get("timestamp")?,
    })
}

/// Spatial search operations
#[async_trait]
pub trait SpatialRepository: Send + Sync {
    /// GPS points within a radius of a center, nearest first
    async fn nearby(&self, query: NearbyQuery) -> DbResult<Vec<NearbyPoint>>;

    /// Geodesic distance between two points, in meters
    async fn distance(&self, from: GeoPoint, to: GeoPoint) -> DbResult<f64>;

    /// GPS points within a named reference location's stored radius
    async fn within_reference(
        &self,
        name: &str,
        source: Option<PointSource>,
        limit: i64,
    ) -> DbResult<WithinReferenceResult>;
}

/// PostGIS-backed spatial repository
#[derive(Debug, Clone)]
pub struct PgSpatialRepository {
    executor: Executor,
}

impl PgSpatialRepository {
    pub fn new(executor: Executor) -> Self {
        Self { executor }
    }

    /// Run the radius search without validating the query.
    ///
    /// `nearby` validates client-supplied radii first; `within_reference`
    /// calls this directly so a stored geofence radius above the request cap
    /// still works.
    async fn scan(&self, query: &NearbyQuery) -> DbResult<Vec<NearbyPoint>> {
        let stmt = nearby_statement(query.source);
        let args = nearby_args(query.center, query.radius_meters, query.limit);
        let rows = self.executor.fetch_all(&stmt, &args).await?;
        rows.iter().map(nearby_from_row).collect()
    }
}

#[async_trait]
impl SpatialRepository for PgSpatialRepository {
    #[instrument(skip(self))]
    async fn nearby(&self, query: NearbyQuery) -> DbResult<Vec<NearbyPoint>> {
        query.validate()?;
        self.scan(&query).await
    }

    #[instrument(skip(self))]
    async fn distance(&self, from: GeoPoint, to: GeoPoint) -> DbResult<f64> {
        let args = vec![
            SqlArg::Float(from.longitude()),
            SqlArg::Float(from.latitude()),
            SqlArg::Float(to.longitude()),
            SqlArg::Float(to.latitude()),
        ];
        self.executor
            .fetch_scalar::<f64>(&DISTANCE, &args)
            .await?
            .ok_or_else(|| DbError::Mapping("distance query returned no value".to_string()))
    }

    #[instrument(skip(self))]
    async fn within_reference(
        &self,
        name: &str,
        source: Option<PointSource>,
        limit: i64,
    ) -> DbResult<WithinReferenceResult> {
        let row = self
            .executor
            .fetch_one(&REFERENCE_LOOKUP, &[SqlArg::Text(name.to_string())])
            .await?
            .ok_or_else(|| DbError::NotFound(format!("reference location '{name}'")))?;

        let latitude: f64 = row.try_get("latitude")?;
        let longitude: f64 = row.try_get("longitude")?;
        let radius_meters: f64 = row.try_get("radius_meters")?;

        // The stored radius is trusted as-is; geofences may legitimately be
        // wider than the cap on client-supplied search radii.
        let center = GeoPoint::new(latitude, longitude)?;
        let points = self
            .scan(&NearbyQuery {
                center,
                radius_meters,
                source,
                limit,
            })
            .await?;

        Ok(WithinReferenceResult {
            reference_name: name.to_string(),
            radius_meters,
            total_points: points.len() as i64,
            points,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn center() -> GeoPoint {
        GeoPoint::new(46.9, 7.4).unwrap()
    }

    #[test]
    fn test_nearby_binds_longitude_first() {
        let args = nearby_args(center(), 500.0, 100);
        assert_eq!(args[0], SqlArg::Float(7.4));
        assert_eq!(args[1], SqlArg::Float(46.9));
        assert_eq!(args[2], SqlArg::Float(500.0));
        assert_eq!(args[3], SqlArg::Int(100));
    }

    #[test]
    fn test_nearby_statement_per_source() {
        let both = nearby_statement(None);
        assert!(both.sql().contains("UNION ALL"));
        assert!(both.sql().contains("public.locations"));
        assert!(both.sql().contains("public.garmin_track_points"));
        assert!(both.sql().ends_with("ORDER BY distance_meters ASC LIMIT $4"));

        let owntracks = nearby_statement(Some(PointSource::Owntracks));
        assert!(!owntracks.sql().contains("UNION ALL"));
        assert!(owntracks.sql().contains("public.locations"));

        let garmin = nearby_statement(Some(PointSource::Garmin));
        assert!(garmin.sql().contains("public.garmin_track_points"));
        assert!(!garmin.sql().contains("public.locations"));
    }

    #[test]
    fn test_nearby_excludes_rows_without_geography() {
        let stmt = nearby_statement(Some(PointSource::Owntracks));
        assert!(stmt.sql().contains("geog IS NOT NULL"));
    }

    #[test]
    fn test_radius_validation() {
        let query = |radius| NearbyQuery {
            center: center(),
            radius_meters: radius,
            source: None,
            limit: 100,
        };

        assert!(query(500.0).validate().is_ok());
        assert!(matches!(
            query(0.0).validate(),
            Err(DbError::Validation(_))
        ));
        assert!(matches!(
            query(-10.0).validate(),
            Err(DbError::Validation(_))
        ));
        assert!(matches!(
            query(MAX_RADIUS_METERS + 1.0).validate(),
            Err(DbError::Validation(_))
        ));
        assert!(matches!(
            query(f64::NAN).validate(),
            Err(DbError::Validation(_))
        ));
    }

    #[test]
    fn test_distance_statement_is_fixed() {
        assert_eq!(DISTANCE.label(), "spatial.distance");
        assert!(DISTANCE.sql().contains("ST_Distance"));
    }
}
