//! Core domain types for the tracklog GPS data API
//!
//! This crate defines the entities served by the API (location points,
//! activities and their track points, reference locations, and the unified
//! GPS views), the pagination envelope, and geographic value objects with
//! validation. It contains no I/O; persistence lives in `tracklog-db`.

pub mod activity;
pub mod error;
pub mod geo;
pub mod location;
pub mod page;
pub mod reference;
pub mod spatial;
pub mod unified;

pub use activity::{Activity, ChartPoint, RoutePoint, SimplifiedRoute, SportCount, TrackPoint};
pub use error::{DomainError, DomainResult};
pub use geo::GeoPoint;
pub use location::{Location, LocationCount, LocationDetail};
pub use page::Page;
pub use reference::{NewReferenceLocation, ReferenceLocation, ReferenceLocationPatch};
pub use spatial::{DistanceResult, NearbyPoint, PointSource, WithinReferenceResult};
pub use unified::{DailySummary, UnifiedGpsPoint};

/// Core crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
