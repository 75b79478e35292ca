//! Application state shared across handlers
//!
//! Repositories are held as trait objects so the HTTP surface can be
//! exercised against in-memory implementations in tests.

use std::sync::Arc;

use tracklog_db::{
    ActivityRepository, LocationRepository, PaginationConfig, ReadinessProbe,
    ReferenceRepository, SpatialRepository, UnifiedRepository,
};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub locations: Arc<dyn LocationRepository>,
    pub activities: Arc<dyn ActivityRepository>,
    pub references: Arc<dyn ReferenceRepository>,
    pub spatial: Arc<dyn SpatialRepository>,
    pub unified: Arc<dyn UnifiedRepository>,
    pub probe: Arc<dyn ReadinessProbe>,
    pub pagination: Arc<PaginationConfig>,
}

impl AppState {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        locations: Arc<dyn LocationRepository>,
        activities: Arc<dyn ActivityRepository>,
        references: Arc<dyn ReferenceRepository>,
        spatial: Arc<dyn SpatialRepository>,
        unified: Arc<dyn UnifiedRepository>,
        probe: Arc<dyn ReadinessProbe>,
        pagination: PaginationConfig,
    ) -> Self {
        Self {
            locations,
            activities,
            references,
            spatial,
            unified,
            probe,
            pagination: Arc::new(pagination),
        }
    }
}
