//! Unified error handling for the directory services.
//!
//! Provides a single error type with a stable client-facing code and a
//! user message that never leaks internal details.

use domain::DomainError;
use thiserror::Error;

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    // Resource errors
    #[error("{0} already exists")]
    Conflict(String),

    // Validation
    #[error("{0}")]
    Validation(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    // Credential errors
    #[error("Password hashing failed")]
    HashingFailure(String),

    #[error("Stored password hash is malformed")]
    MalformedHash(String),

    // Configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    // Internal
    #[error("Internal server error")]
    Internal(String),
}

impl AppError {
    /// Get error code for client
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Conflict(_) => "CONFLICT",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::InvalidDate(_) => "INVALID_DATE",
            AppError::HashingFailure(_) => "INTERNAL_ERROR",
            AppError::MalformedHash(_) => "INTERNAL_ERROR",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if the error was caused by the caller's input
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AppError::Conflict(_)
                | AppError::Validation(_)
                | AppError::InvalidDate(_)
        )
    }

    /// Get user-facing message (hides internal details)
    pub fn user_message(&self) -> String {
        match self {
            // Show full message for client errors
            AppError::Validation(msg) => msg.clone(),
            AppError::InvalidDate(msg) => format!("Invalid date: {}", msg),
            AppError::Conflict(msg) => {
                if msg.ends_with("already exists") {
                    msg.clone()
                } else {
                    format!("{} already exists", msg)
                }
            }

            // Hide details for internal/security errors
            AppError::HashingFailure(msg) => {
                tracing::error!("Hashing failure: {}", msg);
                "An internal error occurred".to_string()
            }
            AppError::MalformedHash(msg) => {
                tracing::error!("Malformed password hash: {}", msg);
                "An internal error occurred".to_string()
            }
            AppError::Config(msg) => {
                tracing::error!("Configuration error: {}", msg);
                "The service is misconfigured".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }
        }
    }
}

// =============================================================================
// Domain Error Conversion
// =============================================================================

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvalidDate(msg) => AppError::InvalidDate(msg),
            DomainError::HashingFailure(msg) => AppError::HashingFailure(msg),
            DomainError::MalformedHash(msg) => AppError::MalformedHash(msg),
        }
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Convenience constructors
impl AppError {
    pub fn conflict(entity: impl Into<String>) -> Self {
        AppError::Conflict(entity.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn hashing(msg: impl Into<String>) -> Self {
        AppError::HashingFailure(msg.into())
    }

    pub fn malformed_hash(msg: impl Into<String>) -> Self {
        AppError::MalformedHash(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        AppError::Config(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}
