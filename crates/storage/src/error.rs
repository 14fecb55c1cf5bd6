use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

impl StorageError {
    /// Errors caused by a lost or unreachable database rather than by the query itself.
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            StorageError::Database(
                sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed
            )
        )
    }

    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            StorageError::Database(sqlx::Error::Database(e))
                if e.code().as_deref() == Some("23505")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_errors_are_classified() {
        assert!(StorageError::Database(sqlx::Error::PoolTimedOut).is_connection_error());
        assert!(StorageError::Database(sqlx::Error::PoolClosed).is_connection_error());
        assert!(!StorageError::Database(sqlx::Error::RowNotFound).is_connection_error());
        assert!(!StorageError::NotFound.is_connection_error());
    }
}
