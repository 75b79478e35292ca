//! Garmin activity endpoint handlers

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use tracklog_core::{Activity, ChartPoint, Page, SportCount};
use tracklog_db::{ActivityFilter, ActivitySortKey, PageParams, TrackPointSortKey};

use crate::error::{ApiError, ApiResult};
use crate::handlers::{parse_order, parse_sort, unpack};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListParams {
    limit: Option<i64>,
    offset: Option<i64>,
    sort: Option<String>,
    order: Option<String>,
    sport: Option<String>,
    date_from: Option<NaiveDate>,
    date_to: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrackParams {
    limit: Option<i64>,
    offset: Option<i64>,
    sort: Option<String>,
    order: Option<String>,
    /// When present, the whole route is returned simplified at this
    /// Douglas-Peucker tolerance (degrees) instead of a page of raw points
    tolerance: Option<f64>,
}

/// Sports recorded in the activity table
#[derive(Debug, Serialize, Deserialize)]
pub struct SportList {
    pub sports: Vec<SportCount>,
}

/// Chart series for one activity
#[derive(Debug, Serialize, Deserialize)]
pub struct ChartData {
    pub activity_id: String,
    pub point_count: usize,
    pub points: Vec<ChartPoint>,
}

/// GET /api/v1/garmin/activities
#[instrument(skip(state, params))]
pub async fn list(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> ApiResult<Json<Page<Activity>>> {
    let params = unpack(params)?;
    let sort = parse_sort::<ActivitySortKey>(params.sort.as_deref())?;
    let order = parse_order(params.order.as_deref())?;
    let page = PageParams::clamp(params.limit, params.offset, &state.pagination.activities);

    let filter = ActivityFilter {
        sport: params.sport,
        date_from: params.date_from,
        date_to: params.date_to,
    };

    let result = state.activities.list(filter, sort, order, page).await?;
    Ok(Json(result))
}

/// GET /api/v1/garmin/sports
#[instrument(skip(state))]
pub async fn sports(State(state): State<AppState>) -> ApiResult<Json<SportList>> {
    let sports = state.activities.sports().await?;
    Ok(Json(SportList { sports }))
}

/// GET /api/v1/garmin/activities/:id
#[instrument(skip(state))]
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Activity>> {
    let activity = state
        .activities
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("activity '{id}'")))?;
    Ok(Json(activity))
}

/// GET /api/v1/garmin/activities/:id/tracks
///
/// Pages through deduplicated track points, or returns the simplified route
/// when a `tolerance` is supplied.
#[instrument(skip(state, params))]
pub async fn tracks(
    State(state): State<AppState>,
    Path(id): Path<String>,
    params: Result<Query<TrackParams>, QueryRejection>,
) -> ApiResult<Response> {
    let params = unpack(params)?;

    if let Some(tolerance) = params.tolerance {
        let route = state.activities.simplified_track(&id, tolerance).await?;
        return Ok(Json(route).into_response());
    }

    let sort = parse_sort::<TrackPointSortKey>(params.sort.as_deref())?;
    let order = parse_order(params.order.as_deref())?;
    let page = PageParams::clamp(params.limit, params.offset, &state.pagination.track_points);

    let result = state.activities.track_points(&id, sort, order, page).await?;
    Ok(Json(result).into_response())
}

/// GET /api/v1/garmin/activities/:id/chart-data
#[instrument(skip(state))]
pub async fn chart_data(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ChartData>> {
    let points = state.activities.chart_data(&id).await?;
    Ok(Json(ChartData {
        activity_id: id,
        point_count: points.len(),
        points,
    }))
}
