//! Domain-level errors.
//!
//! These errors represent business rule violations and domain logic failures.
//! They are independent of infrastructure concerns (transport, storage).

use thiserror::Error;

/// Domain-specific errors for business rule violations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Date could not be parsed or lies in the future
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Hashing engine failed (RNG or algorithm failure)
    #[error("Hashing failure: {0}")]
    HashingFailure(String),

    /// Stored hash is not in the expected encoding
    #[error("Malformed hash: {0}")]
    MalformedHash(String),
}

impl DomainError {
    /// Create an invalid date error
    pub fn invalid_date(msg: impl Into<String>) -> Self {
        DomainError::InvalidDate(msg.into())
    }

    /// Create a hashing failure
    pub fn hashing(msg: impl Into<String>) -> Self {
        DomainError::HashingFailure(msg.into())
    }

    /// Create a malformed hash error
    pub fn malformed_hash(msg: impl Into<String>) -> Self {
        DomainError::MalformedHash(msg.into())
    }
}

/// Result type alias for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
