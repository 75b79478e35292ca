//! Bearer-token authentication for reference location writes
//!
//! Read endpoints are open; mutations on reference locations pass through
//! [`require_auth`]. Tokens are HS256 JWTs validated against a shared secret.
//! With `enabled = false` (development), the middleware is a pass-through.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ApiError;

/// Authentication settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Whether write endpoints require a token
    pub enabled: bool,
    /// HS256 shared secret
    #[serde(default)]
    pub secret: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            secret: String::new(),
        }
    }
}

/// JWT claims accepted on write requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (caller identity)
    pub sub: String,
    /// Expiry, seconds since epoch
    pub exp: usize,
}

/// The authenticated caller, stored in request extensions
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub subject: String,
}

/// Shared state for the auth middleware
#[derive(Clone)]
pub struct AuthState {
    enabled: bool,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl AuthState {
    pub fn new(config: &AuthConfig) -> Result<Self, ApiError> {
        if config.enabled && config.secret.is_empty() {
            return Err(ApiError::new(
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                "auth enabled but no secret configured",
            ));
        }
        Ok(Self {
            enabled: config.enabled,
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        })
    }

    /// Whether the write gate is active
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    fn validate(&self, token: &str) -> Result<Claims, ApiError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                warn!(error = %e, "token validation failed");
                ApiError::unauthorized("invalid or expired token")
            })
    }
}

fn bearer_token(header: &str) -> Option<&str> {
    header.strip_prefix("Bearer ").filter(|t| !t.is_empty())
}

/// Require a valid bearer token; 401 otherwise
pub async fn require_auth(
    State(auth): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !auth.enabled {
        return Ok(next.run(request).await);
    }

    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ApiError::unauthorized("missing authorization header"))?;

    let token = bearer_token(header)
        .ok_or_else(|| ApiError::unauthorized("authorization header is not a bearer token"))?;

    let claims = auth.validate(token)?;
    debug!(subject = %claims.sub, "write request authenticated");

    request.extensions_mut().insert(AuthUser {
        subject: claims.sub,
    });
    Ok(next.run(request).await)
}
