//! Error types for the storage layer.

use haiku_core::{NoteId, UserId};
use thiserror::Error;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// User not found.
    #[error("user not found: {0}")]
    UserNotFound(UserId),

    /// Note not found, or not owned by the requesting user.
    #[error("note not found: {0}")]
    NoteNotFound(NoteId),

    /// A row with the same primary key already exists.
    #[error("already exists: {0}")]
    Conflict(String),

    /// A required argument was empty.
    #[error("invalid argument: {0} is empty")]
    InvalidArgument(&'static str),

    /// The database could not be reached.
    #[error("database connection error: {0}")]
    Connection(#[source] sqlx::Error),

    /// Any other database failure.
    #[error("database query error: {0}")]
    Query(#[source] sqlx::Error),

    /// A stored row could not be converted into a domain value.
    #[error("corrupt row: {0}")]
    CorruptRow(String),

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl StoreError {
    /// Whether this error means the addressed row does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::UserNotFound(_) | Self::NoteNotFound(_))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.is_unique_violation() {
                return Self::Conflict(db.message().to_string());
            }
        }

        if matches!(
            err,
            sqlx::Error::Io(_)
                | sqlx::Error::Tls(_)
                | sqlx::Error::PoolTimedOut
                | sqlx::Error::PoolClosed
                | sqlx::Error::WorkerCrashed
        ) {
            return Self::Connection(err);
        }

        Self::Query(err)
    }
}
