//! Location endpoint handlers

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use tracklog_core::{Location, LocationCount, LocationDetail, Page};
use tracklog_db::{LocationFilter, LocationSortKey, PageParams};

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
    device_id: Option<String>,
    date_from: Option<NaiveDate>,
    date_to: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CountParams {
    date: Option<NaiveDate>,
    device_id: Option<String>,
}

/// Device identifiers that have reported points
#[derive(Debug, Serialize, Deserialize)]
pub struct DeviceList {
    pub devices: Vec<String>,
}

/// GET /api/v1/locations
#[instrument(skip(state, params))]
pub async fn list(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> ApiResult<Json<Page<Location>>> {
    let params = unpack(params)?;
    let sort = parse_sort::<LocationSortKey>(params.sort.as_deref())?;
    let order = parse_order(params.order.as_deref())?;
    let page = PageParams::clamp(params.limit, params.offset, &state.pagination.locations);

    let filter = LocationFilter {
        device_id: params.device_id,
        date_from: params.date_from,
        date_to: params.date_to,
    };

    let result = state.locations.list(filter, sort, order, page).await?;
    Ok(Json(result))
}

/// GET /api/v1/locations/devices
#[instrument(skip(state))]
pub async fn devices(State(state): State<AppState>) -> ApiResult<Json<DeviceList>> {
    let devices = state.locations.devices().await?;
    Ok(Json(DeviceList { devices }))
}

/// GET /api/v1/locations/count
#[instrument(skip(state, params))]
pub async fn count(
    State(state): State<AppState>,
    params: Result<Query<CountParams>, QueryRejection>,
) -> ApiResult<Json<LocationCount>> {
    let params = unpack(params)?;
    let result = state.locations.count(params.date, params.device_id).await?;
    Ok(Json(result))
}

/// GET /api/v1/locations/:id
#[instrument(skip(state))]
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<LocationDetail>> {
    let detail = state
        .locations
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("location {id}")))?;
    Ok(Json(detail))
}
