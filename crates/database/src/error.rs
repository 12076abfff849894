//! Database error types.

use thiserror::Error;

/// Errors raised by the lead profile store.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Connection or query failure.
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Schema migration failure.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl DatabaseError {
    /// Whether the error reports a missing table.
    pub fn is_missing_table(&self) -> bool {
        match self {
            DatabaseError::Sqlx(sqlx::Error::Database(db)) => {
                db.message().contains("no such table")
            }
            _ => false,
        }
    }
}

/// Result type for database operations.
pub type Result<T> = std::result::Result<T, DatabaseError>;
