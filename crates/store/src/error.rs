use sqlx::error::ErrorKind;
use thiserror::Error;

/// Errors that can occur when talking to the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// The statement references a named parameter that was not supplied.
    #[error("Missing parameter: ${0}")]
    MissingParameter(String),

    /// A plain query carried a `RETURNING` clause.
    #[error("RETURNING is only supported through query_returning")]
    ReturningNotAllowed,

    /// A returning mutation was not an `INSERT` or `UPDATE`.
    #[error("Not an INSERT or UPDATE statement")]
    NotAMutation,

    /// A returning mutation targets a different table than the caller declared.
    #[error("Statement targets {found}, expected {expected}")]
    TableMismatch {
        expected: &'static str,
        found: String,
    },

    /// The key of the mutated row could not be determined.
    #[error("Could not determine key of mutated row in {table}")]
    MissingKey { table: &'static str },

    /// The statement produced a different kind of result than requested.
    #[error("Unexpected query outcome: expected {0}")]
    UnexpectedOutcome(&'static str),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// Returns true if the store rejected a write because of a foreign key.
    pub fn is_foreign_key_violation(&self) -> bool {
        matches!(
            self.database_error_kind(),
            Some(ErrorKind::ForeignKeyViolation)
        )
    }

    /// Returns true if the store rejected a write because of a unique constraint.
    pub fn is_unique_violation(&self) -> bool {
        matches!(self.database_error_kind(), Some(ErrorKind::UniqueViolation))
    }

    fn database_error_kind(&self) -> Option<ErrorKind> {
        match self {
            StoreError::Database(sqlx::Error::Database(db_err)) => Some(db_err.kind()),
            _ => None,
        }
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
