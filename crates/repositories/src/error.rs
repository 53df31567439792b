//! Repository error types.

use domain::DomainError;
use store::StoreError;
use thiserror::Error;

/// Errors that can occur in repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The requested row does not exist or is not visible to the caller.
    #[error("{entity} not found")]
    NotFound { entity: &'static str, id: String },

    /// The request was rejected before or by the store. Safe to show to clients.
    #[error("{0}")]
    Validation(String),

    /// An error occurred in the store.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// A domain rule failed in a way that is not the caller's fault.
    #[error("Domain error: {0}")]
    Domain(DomainError),
}

impl RepositoryError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        RepositoryError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

impl From<DomainError> for RepositoryError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(_)
            | DomainError::InvalidTransition { .. }
            | DomainError::UnknownStatus(_) => RepositoryError::Validation(err.to_string()),
            other => RepositoryError::Domain(other),
        }
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        RepositoryError::Store(StoreError::Serialization(err))
    }
}

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;

/// Maps store failures of an insert or update.
///
/// Unique violations become validation errors and foreign-key violations
/// mean a referenced row is missing.
pub(crate) fn write_error(err: StoreError, entity: &'static str, missing: &'static str) -> RepositoryError {
    if err.is_unique_violation() {
        RepositoryError::Validation(format!("{entity} already exists"))
    } else if err.is_foreign_key_violation() {
        RepositoryError::not_found(missing, "reference")
    } else {
        RepositoryError::Store(err)
    }
}

/// Maps store failures of a delete: a foreign-key violation means other rows
/// still reference the target.
pub(crate) fn delete_error(err: StoreError, entity: &'static str) -> RepositoryError {
    if err.is_foreign_key_violation() {
        RepositoryError::Validation(format!("{entity} is still in use"))
    } else {
        RepositoryError::Store(err)
    }
}
