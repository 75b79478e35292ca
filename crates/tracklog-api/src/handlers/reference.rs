//! Reference location (geofence) endpoint handlers
//!
//! Writes here are the only mutations the service exposes; the router gates
//! them behind bearer-token auth.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::{info, instrument};

use tracklog_core::{NewReferenceLocation, ReferenceLocation, ReferenceLocationPatch};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// GET /api/v1/reference-locations
#[instrument(skip(state))]
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<ReferenceLocation>>> {
    let references = state.references.list().await?;
    Ok(Json(references))
}

/// GET /api/v1/reference-locations/:id
#[instrument(skip(state))]
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<ReferenceLocation>> {
    let reference = state
        .references
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("reference location {id}")))?;
    Ok(Json(reference))
}

/// POST /api/v1/reference-locations
#[instrument(skip(state, new), fields(name = %new.name))]
pub async fn create(
    State(state): State<AppState>,
    Json(new): Json<NewReferenceLocation>,
) -> ApiResult<(StatusCode, Json<ReferenceLocation>)> {
    info!(name = %new.name, "creating reference location");
    let created = state.references.create(new).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PATCH /api/v1/reference-locations/:id
#[instrument(skip(state, patch))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<ReferenceLocationPatch>,
) -> ApiResult<Json<ReferenceLocation>> {
    info!(id, "updating reference location");
    let updated = state.references.update(id, patch).await?;
    Ok(Json(updated))
}

/// DELETE /api/v1/reference-locations/:id
#[instrument(skip(state))]
pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<StatusCode> {
    info!(id, "deleting reference location");
    state.references.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
