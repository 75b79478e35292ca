//! API route definitions
//!
//! Builds the full router. Reference location writes are layered with the
//! auth middleware; everything else is open.

use axum::{
    middleware,
    routing::{delete, get, patch, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{require_auth, AuthState};
use crate::handlers::{activities, gps, health, locations, reference, spatial};
use crate::state::AppState;

/// Build the API router with all routes
pub fn build_router(state: AppState, auth: AuthState) -> Router {
    Router::new()
        .route("/health", get(health::liveness))
        .route("/ready", get(health::readiness))
        .nest("/api/v1", v1_routes(auth))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

fn v1_routes(auth: AuthState) -> Router<AppState> {
    let reference_writes = Router::new()
        .route("/reference-locations", post(reference::create))
        .route("/reference-locations/:id", patch(reference::update))
        .route("/reference-locations/:id", delete(reference::delete))
        .layer(middleware::from_fn_with_state(auth, require_auth));

    Router::new()
        // OwnTracks locations
        .route("/locations", get(locations::list))
        .route("/locations/devices", get(locations::devices))
        .route("/locations/count", get(locations::count))
        .route("/locations/:id", get(locations::get))
        // Garmin activities
        .route("/garmin/activities", get(activities::list))
        .route("/garmin/sports", get(activities::sports))
        .route("/garmin/activities/:id", get(activities::get))
        .route("/garmin/activities/:id/tracks", get(activities::tracks))
        .route(
            "/garmin/activities/:id/chart-data",
            get(activities::chart_data),
        )
        // Reference locations (reads open, writes gated)
        .route("/reference-locations", get(reference::list))
        .route("/reference-locations/:id", get(reference::get))
        .merge(reference_writes)
        // Spatial queries
        .route("/spatial/nearby", get(spatial::nearby))
        .route("/spatial/distance", get(spatial::distance))
        .route(
            "/spatial/within-reference/:name",
            get(spatial::within_reference),
        )
        // Unified views
        .route("/gps/unified", get(gps::unified))
        .route("/gps/daily-summary", get(gps::daily_summary))
}
