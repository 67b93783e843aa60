//! Repository error type shared by the storage adapters

use flex_core::error::FlexError;

/// Error type for repository operations
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored row could not be mapped back to a model
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),
}

/// Result type for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

impl From<RepositoryError> for FlexError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(what) => FlexError::NotFound {
                entity: "Record",
                field: "id",
                value: what,
            },
            RepositoryError::Database(e) => FlexError::Database(e.to_string()),
            RepositoryError::Validation(msg) => FlexError::Internal(msg),
            RepositoryError::Conflict(msg) => FlexError::invalid("base", msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_errors_are_server_errors() {
        let err: FlexError = RepositoryError::Database(sqlx::Error::PoolTimedOut).into();
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.error_code(), "DatabaseError");
    }

    #[test]
    fn test_corrupt_row_is_internal() {
        let err: FlexError = RepositoryError::Validation("bad role".into()).into();
        assert!(matches!(err, FlexError::Internal(_)));
    }

    #[test]
    fn test_conflict_is_validation() {
        let err: FlexError = RepositoryError::Conflict("email taken".into()).into();
        assert_eq!(err.status_code(), 422);
    }
}
