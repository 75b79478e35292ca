//! Unified GPS view endpoint handlers

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use tracklog_core::{DailySummary, Page, PointSource, UnifiedGpsPoint};
use tracklog_db::{PageParams, UnifiedFilter};

use crate::error::ApiResult;
use crate::handlers::unpack;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UnifiedParams {
    limit: Option<i64>,
    offset: Option<i64>,
    source: Option<PointSource>,
    date_from: Option<NaiveDate>,
    date_to: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DailySummaryParams {
    date_from: Option<NaiveDate>,
    date_to: Option<NaiveDate>,
    limit: Option<i64>,
}

/// Daily summary response
#[derive(Debug, Serialize, Deserialize)]
pub struct DailySummaryList {
    pub days: Vec<DailySummary>,
}

/// GET /api/v1/gps/unified
#[instrument(skip(state, params))]
pub async fn unified(
    State(state): State<AppState>,
    params: Result<Query<UnifiedParams>, QueryRejection>,
) -> ApiResult<Json<Page<UnifiedGpsPoint>>> {
    let params = unpack(params)?;
    let page = PageParams::clamp(params.limit, params.offset, &state.pagination.unified);

    let filter = UnifiedFilter {
        source: params.source,
        date_from: params.date_from,
        date_to: params.date_to,
    };

    let result = state.unified.unified(filter, page).await?;
    Ok(Json(result))
}

/// GET /api/v1/gps/daily-summary
#[instrument(skip(state, params))]
pub async fn daily_summary(
    State(state): State<AppState>,
    params: Result<Query<DailySummaryParams>, QueryRejection>,
) -> ApiResult<Json<DailySummaryList>> {
    let params = unpack(params)?;
    let limit = state.pagination.daily_summary.clamp_limit(params.limit);

    let days = state
        .unified
        .daily_summary(params.date_from, params.date_to, limit)
        .await?;
    Ok(Json(DailySummaryList { days }))
}
