//! Spatial query endpoint handlers

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use tracklog_core::{DistanceResult, GeoPoint, NearbyPoint, PointSource, WithinReferenceResult};
use tracklog_db::NearbyQuery;

use crate::error::ApiResult;
use crate::handlers::unpack;
use crate::state::AppState;

/// Default search radius when the client omits one, in meters
const DEFAULT_RADIUS_METERS: f64 = 1000.0;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NearbyParams {
    lat: f64,
    lon: f64,
    radius_meters: Option<f64>,
    source: Option<PointSource>,
    limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DistanceParams {
    from_lat: f64,
    from_lon: f64,
    to_lat: f64,
    to_lon: f64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WithinParams {
    source: Option<PointSource>,
    limit: Option<i64>,
}

/// Radius search response
#[derive(Debug, Serialize, Deserialize)]
pub struct NearbyResponse {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_meters: f64,
    pub count: usize,
    pub points: Vec<NearbyPoint>,
}

/// GET /api/v1/spatial/nearby
#[instrument(skip(state, params))]
pub async fn nearby(
    State(state): State<AppState>,
    params: Result<Query<NearbyParams>, QueryRejection>,
) -> ApiResult<Json<NearbyResponse>> {
    let params = unpack(params)?;
    let center = GeoPoint::new(params.lat, params.lon)?;
    let radius_meters = params.radius_meters.unwrap_or(DEFAULT_RADIUS_METERS);
    let limit = state.pagination.nearby.clamp_limit(params.limit);

    let points = state
        .spatial
        .nearby(NearbyQuery {
            center,
            radius_meters,
            source: params.source,
            limit,
        })
        .await?;

    Ok(Json(NearbyResponse {
        latitude: center.latitude(),
        longitude: center.longitude(),
        radius_meters,
        count: points.len(),
        points,
    }))
}

/// GET /api/v1/spatial/distance
#[instrument(skip(state, params))]
pub async fn distance(
    State(state): State<AppState>,
    params: Result<Query<DistanceParams>, QueryRejection>,
) -> ApiResult<Json<DistanceResult>> {
    let params = unpack(params)?;
    let from = GeoPoint::new(params.from_lat, params.from_lon)?;
    let to = GeoPoint::new(params.to_lat, params.to_lon)?;

    let distance_meters = state.spatial.distance(from, to).await?;

    Ok(Json(DistanceResult {
        distance_meters,
        from_lat: from.latitude(),
        from_lon: from.longitude(),
        to_lat: to.latitude(),
        to_lon: to.longitude(),
    }))
}

/// GET /api/v1/spatial/within-reference/:name
#[instrument(skip(state, params))]
pub async fn within_reference(
    State(state): State<AppState>,
    Path(name): Path<String>,
    params: Result<Query<WithinParams>, QueryRejection>,
) -> ApiResult<Json<WithinReferenceResult>> {
    let params = unpack(params)?;
    let limit = state.pagination.nearby.clamp_limit(params.limit);

    let result = state
        .spatial
        .within_reference(&name, params.source, limit)
        .await?;
    Ok(Json(result))
}
