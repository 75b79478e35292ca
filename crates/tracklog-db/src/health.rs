//! Database readiness probe
//!
//! Backs the `/ready` endpoint: a real round-trip to PostgreSQL, as opposed
//! to the process-liveness `/health` which never touches the database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::Row;
use tracing::instrument;

use crate::error::{DbError, DbResult};
use crate::executor::{Executor, Statement};
use crate::pool::PoolStats;

const READY: Statement = Statement::fixed(
    "health.ready",
    "SELECT version() AS version, NOW() AS server_time",
);

/// Snapshot of database health for the readiness response
#[derive(Debug, Clone, Serialize)]
pub struct DbHealth {
    pub version: String,
    pub server_time: DateTime<Utc>,
    pub pool_size: u32,
    pub pool_idle: u32,
}

/// Readiness check against a backing store
#[async_trait]
pub trait ReadinessProbe: Send + Sync {
    /// Verify the store answers queries; any failure is `Unavailable`
    async fn check(&self) -> DbResult<DbHealth>;
}

/// Probe backed by the live connection pool
#[derive(Debug, Clone)]
pub struct DatabaseProbe {
    executor: Executor,
}

impl DatabaseProbe {
    pub fn new(executor: Executor) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl ReadinessProbe for DatabaseProbe {
    #[instrument(skip(self))]
    async fn check(&self) -> DbResult<DbHealth> {
        let row = self
            .executor
            .fetch_one(&READY, &[])
            .await
            .map_err(|e| DbError::Unavailable(e.to_string()))?
            .ok_or_else(|| DbError::Unavailable("readiness query returned no row".to_string()))?;

        let version: String = row
            .try_get("version")
            .map_err(|e| DbError::Unavailable(e.to_string()))?;
        let server_time: DateTime<Utc> = row
            .try_get("server_time")
            .map_err(|e| DbError::Unavailable(e.to_string()))?;

        let stats = PoolStats::of(self.executor.pool());
        Ok(DbHealth {
            version,
            server_time,
            pool_size: stats.total_connections,
            pool_idle: stats.idle_connections,
        })
    }
}
