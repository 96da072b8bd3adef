//! Error types for the currency rates service.

use std::time::Duration;

/// Domain-level errors (validation and business rule violations).
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("Currency code must be 3 uppercase letters, got {0:?}")]
    InvalidCurrencyCode(String),

    #[error("Invalid rate: {0}")]
    InvalidRate(String),

    #[error("Currency with code {0} already exists")]
    DuplicateCurrency(String),

    #[error("Currency not found: {0}")]
    CurrencyNotFound(String),

    #[error("Exchange rate not available for {0}")]
    RateUnavailable(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Repository-level errors (data access failures).
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Conflict: {0}")]
    Conflict(String),
}

/// Errors raised by the rate provider client.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Provider request failed: {0}")]
    Http(String),

    #[error("Provider returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Provider response could not be decoded: {0}")]
    Decode(String),

    #[error("Provider call timed out after {0:?}")]
    Timeout(Duration),
}

/// Application-level errors (for HTTP responses).
///
/// Maps cleanly to HTTP status codes.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rate unavailable: {0}")]
    RateUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::CurrencyNotFound(code) => {
                AppError::NotFound(format!("Currency not found: {}", code))
            }
            DomainError::RateUnavailable(msg) => AppError::RateUnavailable(msg),
            e => AppError::BadRequest(e.to_string()),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Domain(e) => e.into(),
            RepoError::NotFound => AppError::NotFound("Resource not found".into()),
            RepoError::Database(e) => AppError::Internal(e),
            RepoError::Conflict(e) => AppError::BadRequest(e),
        }
    }
}
