//! Database error types.

use derive_more::{Display, Error};
use diesel::result::DatabaseErrorKind;
use tracing::instrument;

/// Category of a database failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum DbErrorKind {
    /// The storage medium could not be reached.
    #[display("storage unavailable")]
    StorageUnavailable,
    /// A unique constraint rejected the write.
    #[display("duplicate key conflict")]
    DuplicateKeyConflict,
    /// The record was rejected before reaching storage.
    #[display("validation failed")]
    Validation,
    /// Any other failure while executing a statement.
    #[display("query failed")]
    Query,
}

/// Database error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Database error ({}): {} at {}:{}", kind, message, file, line)]
pub struct DbError {
    /// Failure category.
    pub kind: DbErrorKind,
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl DbError {
    /// Creates a new database error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(kind: DbErrorKind, message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// Creates a validation error for a record rejected before storage.
    #[track_caller]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(DbErrorKind::Validation, message)
    }

    /// Creates an error for an unreachable storage medium.
    #[track_caller]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(DbErrorKind::StorageUnavailable, message)
    }
}

impl From<diesel::result::Error> for DbError {
    #[track_caller]
    fn from(err: diesel::result::Error) -> Self {
        use diesel::result::Error;

        let kind = match &err {
            Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                DbErrorKind::DuplicateKeyConflict
            }
            Error::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
                DbErrorKind::StorageUnavailable
            }
            _ => DbErrorKind::Query,
        };
        Self::new(kind, format!("Diesel error: {}", err))
    }
}

impl From<diesel::ConnectionError> for DbError {
    #[track_caller]
    fn from(err: diesel::ConnectionError) -> Self {
        Self::unavailable(format!("Connection error: {}", err))
    }
}
