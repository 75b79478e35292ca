//! Health and readiness handlers
//!
//! `/health` answers as long as the process runs; `/ready` round-trips the
//! database and fails with 503 when it cannot.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use tracing::instrument;

use tracklog_db::DbHealth;

use crate::error::ApiResult;
use crate::state::AppState;

/// Liveness response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Readiness response
#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    pub database: DbHealth,
}

/// GET /health
pub async fn liveness() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: tracklog_core::VERSION,
    })
}

/// GET /ready
#[instrument(skip(state))]
pub async fn readiness(State(state): State<AppState>) -> ApiResult<Json<ReadyResponse>> {
    let database = state.probe.check().await?;
    Ok(Json(ReadyResponse {
        status: "ready",
        database,
    }))
}
