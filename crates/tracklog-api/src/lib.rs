//! HTTP API for the tracklog GPS data service
//!
//! Thin axum boundary over `tracklog-db`: route definitions, query-parameter
//! extraction, error-to-status mapping, and the bearer-token gate on
//! reference location writes. No query logic lives here.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use auth::{AuthConfig, AuthState, Claims};
pub use error::{ApiError, ApiResult, ErrorResponse};
pub use routes::build_router;
pub use state::AppState;
