//! Typed query executor
//!
//! A thin wrapper over the pool that runs parameterized statements. Two
//! properties are enforced here rather than by convention:
//!
//! - SQL text is a [`Statement`], constructible only from `&'static str` or
//!   by this crate's query/spatial compilers. Caller-controlled strings
//!   cannot become SQL text, so string-concatenation injection has no entry
//!   point at the type level.
//! - Arguments are a tagged [`SqlArg`] list bound positionally; they never
//!   appear in the statement text, and errors carry only the statement label.
//!
//! Each call acquires a connection from the pool for its own duration and
//! releases it on every exit path (sqlx returns the connection when the
//! query future completes or is dropped, which also covers caller-side
//! cancellation).

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{PgPool, Postgres};
use std::borrow::Cow;
use std::time::Duration;
use tracing::debug;

use crate::error::{DbError, DbResult};

/// Default per-statement timeout
pub const DEFAULT_STATEMENT_TIMEOUT_SECS: u64 = 30;

/// A SQL statement with a stable label for error reporting.
///
/// There is deliberately no public constructor taking a `String`; dynamic
/// statements come only from the compilers in [`crate::query`] and
/// [`crate::spatial`].
#[derive(Debug, Clone)]
pub struct Statement {
    label: &'static str,
    sql: Cow<'static, str>,
}

impl Statement {
    /// A statement whose text is fixed at compile time
    pub const fn fixed(label: &'static str, sql: &'static str) -> Self {
        Self {
            label,
            sql: Cow::Borrowed(sql),
        }
    }

    /// A statement assembled by one of this crate's compilers
    pub(crate) fn compiled(label: &'static str, sql: String) -> Self {
        Self {
            label,
            sql: Cow::Owned(sql),
        }
    }

    /// Stable identity for logs and errors
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// The SQL text
    pub fn sql(&self) -> &str {
        &self.sql
    }
}

/// A positionally bound statement argument
#[derive(Debug, Clone, PartialEq)]
pub enum SqlArg {
    Text(String),
    /// An explicit SQL NULL in a text position
    NullText,
    Int(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
    TextArray(Vec<String>),
}

fn bind_args<'q>(
    mut query: Query<'q, Postgres, PgArguments>,
    args: &[SqlArg],
) -> Query<'q, Postgres, PgArguments> {
    for arg in args {
        query = match arg {
            SqlArg::Text(v) => query.bind(v.clone()),
            SqlArg::NullText => query.bind(Option::<String>::None),
            SqlArg::Int(v) => query.bind(*v),
            SqlArg::Float(v) => query.bind(*v),
            SqlArg::Bool(v) => query.bind(*v),
            SqlArg::Date(v) => query.bind(*v),
            SqlArg::Timestamp(v) => query.bind(*v),
            SqlArg::TextArray(v) => query.bind(v.clone()),
        };
    }
    query
}

/// Executes parameterized statements against a pooled connection
#[derive(Debug, Clone)]
pub struct Executor {
    pool: PgPool,
    statement_timeout: Duration,
}

impl Executor {
    /// Create an executor over the given pool
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            statement_timeout: Duration::from_secs(DEFAULT_STATEMENT_TIMEOUT_SECS),
        }
    }

    /// Set the per-statement timeout
    pub fn with_statement_timeout(mut self, timeout: Duration) -> Self {
        self.statement_timeout = timeout;
        self
    }

    /// The underlying pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn timed<T, F>(&self, stmt: &Statement, fut: F) -> DbResult<T>
    where
        F: std::future::Future<Output = Result<T, sqlx::Error>>,
    {
        match tokio::time::timeout(self.statement_timeout, fut).await {
            Ok(result) => result.map_err(|e| DbError::from_driver(stmt.label(), e)),
            Err(_) => Err(DbError::Query {
                statement: stmt.label().to_string(),
                message: format!(
                    "statement timeout after {}s",
                    self.statement_timeout.as_secs()
                ),
            }),
        }
    }

    /// Run a statement and return all rows
    pub async fn fetch_all(&self, stmt: &Statement, args: &[SqlArg]) -> DbResult<Vec<PgRow>> {
        debug!(statement = stmt.label(), "fetch_all");
        let query = bind_args(sqlx::query(stmt.sql()), args);
        self.timed(stmt, query.fetch_all(&self.pool)).await
    }

    /// Run a statement and return at most one row
    pub async fn fetch_one(&self, stmt: &Statement, args: &[SqlArg]) -> DbResult<Option<PgRow>> {
        debug!(statement = stmt.label(), "fetch_one");
        let query = bind_args(sqlx::query(stmt.sql()), args);
        self.timed(stmt, query.fetch_optional(&self.pool)).await
    }

    /// Run a statement and decode the first column of the first row
    pub async fn fetch_scalar<T>(&self, stmt: &Statement, args: &[SqlArg]) -> DbResult<Option<T>>
    where
        T: for<'r> sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres> + Send + Unpin,
    {
        debug!(statement = stmt.label(), "fetch_scalar");
        let mut query = sqlx::query_scalar::<Postgres, T>(stmt.sql());
        for arg in args {
            query = match arg {
                SqlArg::Text(v) => query.bind(v.clone()),
                SqlArg::NullText => query.bind(Option::<String>::None),
                SqlArg::Int(v) => query.bind(*v),
                SqlArg::Float(v) => query.bind(*v),
                SqlArg::Bool(v) => query.bind(*v),
                SqlArg::Date(v) => query.bind(*v),
                SqlArg::Timestamp(v) => query.bind(*v),
                SqlArg::TextArray(v) => query.bind(v.clone()),
            };
        }
        self.timed(stmt, query.fetch_optional(&self.pool)).await
    }

    /// Run a statement and return the affected row count
    pub async fn execute(&self, stmt: &Statement, args: &[SqlArg]) -> DbResult<u64> {
        debug!(statement = stmt.label(), "execute");
        let query = bind_args(sqlx::query(stmt.sql()), args);
        let result = self.timed(stmt, query.execute(&self.pool)).await?;
        Ok(result.rows_affected())
    }
}
