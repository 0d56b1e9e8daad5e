use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Another transition touched the same lane first. Re-fetch and retry.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Integrity error: {0}")]
    Integrity(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

impl From<sqlx::Error> for StorageError {
    fn from(error: sqlx::Error) -> Self {
        match &error {
            sqlx::Error::PoolTimedOut => {
                StorageError::Timeout("timed out waiting for a database connection".to_string())
            }
            sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
                Some("40001") | Some("40P01") => {
                    StorageError::Conflict(format!("concurrent update: {}", db_err.message()))
                }
                Some("55P03") | Some("57014") => {
                    StorageError::Timeout(format!("lock or statement timeout: {}", db_err.message()))
                }
                _ => StorageError::Database(error),
            },
            _ => StorageError::Database(error),
        }
    }
}

impl StorageError {
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        StorageError::NotFound(format!("{} {} does not exist", entity, id))
    }

    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            StorageError::Database(sqlx::Error::Database(e))
                if e.code().as_deref() == Some("23505")
        )
    }

    /// Conflicts and timeouts leave no partial state behind; the caller may
    /// re-fetch lane state and repeat the action.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StorageError::Conflict(_) | StorageError::Timeout(_))
    }

    /// Unique-index races inside a lane transition are lost races, not bad data.
    pub(crate) fn unique_as_conflict(self, what: &str) -> Self {
        if self.is_unique_violation() {
            StorageError::Conflict(format!("{} changed concurrently", what))
        } else {
            self
        }
    }
}
