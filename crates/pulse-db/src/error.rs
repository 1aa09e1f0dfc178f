//! Database errors

use thiserror::Error;

/// Database errors
#[derive(Error, Debug)]
pub enum DbError {
    /// SQLx error
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Migration error
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Record not found
    #[error("record not found")]
    NotFound,

    /// Stored data could not be decoded into domain types
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

/// Result alias for repository operations
pub type DbResult<T> = Result<T, DbError>;
