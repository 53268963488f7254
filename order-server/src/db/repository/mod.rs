//! Repository Module
//!
//! CRUD operations over SQLite as free functions taking `&SqlitePool`.

// Catalog
pub mod menu;
pub mod pricing_config;

// Identity
pub mod address;
pub mod customer;

// Orders
pub mod order;
pub mod payment;

use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl RepoError {
    /// Whether this error came from a UNIQUE constraint violation
    pub fn is_duplicate(&self) -> bool {
        matches!(self, RepoError::Duplicate(_))
    }
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => RepoError::NotFound("row not found".to_string()),
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepoError::Duplicate(db.message().to_string())
            }
            _ => RepoError::Database(err.to_string()),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;
