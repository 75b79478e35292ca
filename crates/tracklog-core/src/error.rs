//! Domain validation errors

use thiserror::Error;

/// Result type alias for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Errors raised by domain value-object constructors
#[derive(Debug, Error)]
pub enum DomainError {
    /// A value is outside its declared range
    #[error("validation error: {0}")]
    Validation(String),
}

impl DomainError {
    /// Build a validation error from a displayable message
    pub fn validation(msg: impl Into<String>) -> Self {
        DomainError::Validation(msg.into())
    }
}
