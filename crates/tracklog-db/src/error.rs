//! Database-layer error taxonomy
//!
//! Every failure leaving this crate is one of these variants; low-level
//! driver errors are translated on the way out and never propagate raw.
//! Query failures carry the statement's label, never bound argument values,
//! so logs cannot leak coordinates or device identifiers.

use thiserror::Error;

/// Result type alias for database operations
pub type DbResult<T> = Result<T, DbError>;

/// Database-layer errors
#[derive(Debug, Error)]
pub enum DbError {
    /// Unrecognized filter or sort name supplied by the client
    #[error("invalid filter: {0}")]
    InvalidFilter(String),

    /// Entity or named reference does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Value outside its declared range (second line of defense)
    #[error("validation error: {0}")]
    Validation(String),

    /// Unique constraint violation
    #[error("conflict: {0}")]
    Conflict(String),

    /// No connection became available within the acquire timeout
    #[error("timed out waiting for a database connection")]
    ConnectTimeout,

    /// The pool is closed or cannot hand out connections
    #[error("connection pool exhausted or closed")]
    PoolExhausted,

    /// Network or handshake failure talking to the database
    #[error("database connection error: {0}")]
    Connection(String),

    /// A statement failed; identified by label, not by its arguments
    #[error("query failed [{statement}]: {message}")]
    Query { statement: String, message: String },

    /// A row could not be decoded into its entity shape
    #[error("row mapping error: {0}")]
    Mapping(String),

    /// Bad pool or database configuration
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Readiness probe failure
    #[error("database unavailable: {0}")]
    Unavailable(String),
}

impl DbError {
    /// Check if this error is a not-found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, DbError::NotFound(_))
    }

    /// Check if this is a transient error the caller may retry with backoff
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            DbError::ConnectTimeout | DbError::PoolExhausted | DbError::Connection(_)
        )
    }

    /// Check if this error was caused by the client's request
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            DbError::InvalidFilter(_) | DbError::Validation(_) | DbError::NotFound(_)
        )
    }

    /// Translate a driver error for a labeled statement.
    ///
    /// PostgreSQL error codes:
    /// <https://www.postgresql.org/docs/current/errcodes-appendix.html>
    pub(crate) fn from_driver(statement: &str, err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound("no rows returned".to_string()),
            sqlx::Error::PoolTimedOut => DbError::ConnectTimeout,
            sqlx::Error::PoolClosed => DbError::PoolExhausted,
            sqlx::Error::Io(e) => DbError::Connection(format!("I/O error: {e}")),
            sqlx::Error::Tls(e) => DbError::Connection(format!("TLS error: {e}")),
            sqlx::Error::Protocol(msg) => DbError::Connection(format!("protocol error: {msg}")),
            sqlx::Error::ColumnNotFound(col) => {
                DbError::Mapping(format!("column not found: {col}"))
            }
            sqlx::Error::ColumnDecode { index, source } => {
                DbError::Mapping(format!("column {index}: {source}"))
            }
            sqlx::Error::Decode(e) => DbError::Mapping(format!("decode error: {e}")),
            sqlx::Error::TypeNotFound { type_name } => {
                DbError::Mapping(format!("type not found: {type_name}"))
            }
            sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
                // unique_violation
                Some("23505") => DbError::Conflict(db_err.message().to_string()),
                _ => DbError::Query {
                    statement: statement.to_string(),
                    message: db_err.message().to_string(),
                },
            },
            other => DbError::Query {
                statement: statement.to_string(),
                message: other.to_string(),
            },
        }
    }
}

/// Fallback conversion for call sites without a statement label (row mapping,
/// pool construction).
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        DbError::from_driver("(unlabeled)", err)
    }
}

impl From<tracklog_core::DomainError> for DbError {
    fn from(err: tracklog_core::DomainError) -> Self {
        match err {
            tracklog_core::DomainError::Validation(msg) => DbError::Validation(msg),
        }
    }
}
