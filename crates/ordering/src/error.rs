//! Ordering error types.

use domain::DomainError;
use store::StoreError;
use thiserror::Error;

/// Errors that can occur while placing an order.
#[derive(Debug, Error)]
pub enum OrderingError {
    /// The request cannot be priced or fails validation.
    #[error("{0}")]
    Validation(String),

    /// The distance between the two addresses could not be estimated.
    #[error("Distance estimation failed: {0}")]
    Distance(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Domain error: {0}")]
    Domain(DomainError),
}

impl From<DomainError> for OrderingError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(message) => OrderingError::Validation(message),
            other => OrderingError::Domain(other),
        }
    }
}

/// Convenience type alias for ordering results.
pub type Result<T> = std::result::Result<T, OrderingError>;
