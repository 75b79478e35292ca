//! Data access layer for the tracklog GPS API
//!
//! Everything between the HTTP boundary and PostgreSQL/PostGIS lives here:
//! the connection pool, the typed query executor, the filter and pagination
//! compiler, the spatial predicate builder, the per-entity repositories, and
//! the readiness probe.
//!
//! Two design rules hold throughout:
//!
//! - SQL text never contains caller data. Identifiers come from closed enums
//!   and `&'static str` constants; values travel as positional arguments.
//! - Every failure is a [`DbError`] variant; raw driver errors do not escape,
//!   and query errors carry a statement label rather than argument values.

pub mod activities;
pub mod error;
pub mod executor;
pub mod health;
pub mod locations;
pub mod pool;
pub mod query;
pub mod reference;
pub mod spatial;
pub mod unified;

pub use activities::{
    ActivityFilter, ActivityRepository, ActivitySortKey, PgActivityRepository, TrackPointSortKey,
};
pub use error::{DbError, DbResult};
pub use executor::{Executor, SqlArg, Statement};
pub use health::{DatabaseProbe, DbHealth, ReadinessProbe};
pub use locations::{LocationFilter, LocationRepository, LocationSortKey, PgLocationRepository};
pub use pool::{close_pool, create_pool, PoolConfig, PoolStats};
pub use query::{PageLimits, PageParams, PaginationConfig, SortDir};
pub use reference::{PgReferenceRepository, ReferenceRepository};
pub use spatial::{NearbyQuery, PgSpatialRepository, SpatialRepository};
pub use unified::{PgUnifiedRepository, UnifiedFilter, UnifiedRepository};
