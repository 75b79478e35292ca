//! Named reference locations (geofences)
//!
//! A reference location is a named circular region: center point plus radius
//! in meters. These are the only mutable rows this service owns; writes go
//! through the authenticated API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// A stored geofence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceLocation {
    pub id: i64,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub radius_meters: f64,
    pub description: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Payload for creating a reference location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewReferenceLocation {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default = "default_radius")]
    pub radius_meters: f64,
    pub description: Option<String>,
}

fn default_radius() -> f64 {
    50.0
}

impl NewReferenceLocation {
    /// Validate coordinate ranges and radius
    pub fn validate(&self) -> DomainResult<()> {
        crate::geo::GeoPoint::new(self.latitude, self.longitude)?;
        if !(self.radius_meters > 0.0) {
            return Err(DomainError::validation(format!(
                "radius_meters must be positive, got {}",
                self.radius_meters
            )));
        }
        Ok(())
    }
}

/// Partial update for a reference location; `None` fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReferenceLocationPatch {
    pub name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub radius_meters: Option<f64>,
    pub description: Option<String>,
}

impl ReferenceLocationPatch {
    /// Whether the patch changes anything at all
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.latitude.is_none()
            && self.longitude.is_none()
            && self.radius_meters.is_none()
            && self.description.is_none()
    }

    /// Validate the supplied fields
    pub fn validate(&self) -> DomainResult<()> {
        if let Some(lat) = self.latitude {
            if !(-90.0..=90.0).contains(&lat) {
                return Err(DomainError::validation(format!(
                    "latitude {lat} outside [-90, 90]"
                )));
            }
        }
        if let Some(lon) = self.longitude {
            if !(-180.0..=180.0).contains(&lon) {
                return Err(DomainError::validation(format!(
                    "longitude {lon} outside [-180, 180]"
                )));
            }
        }
        if let Some(r) = self.radius_meters {
            if !(r > 0.0) {
                return Err(DomainError::validation(format!(
                    "radius_meters must be positive, got {r}"
                )));
            }
        }
        Ok(())
    }
}
