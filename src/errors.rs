//! Unified error types for the floor backend.
//!
//! Every operation in [`crate::core`] returns [`Result`]. The boundary adapter
//! turns an [`Error`] into a response through [`Error::kind`] and
//! [`Error::status_code`]; nothing here is retried.

use sea_orm::{DbErr, RuntimeErr, SqlErr, sqlx};
use thiserror::Error;

/// Errors raised by configuration, persistence and the lifecycle operations.
#[derive(Debug, Error)]
pub enum Error {
    /// No authenticated actor accompanied the call
    #[error("Authentication required")]
    AuthenticationRequired,

    /// The actor's role is not allowed to perform the operation
    #[error("Role '{role}' is not allowed to {operation}")]
    AuthorizationDenied {
        /// Role the actor holds
        role: String,
        /// Operation that was refused
        operation: String,
    },

    /// A business rule or input shape was violated
    #[error("{message}")]
    Validation {
        /// Human-readable reason, safe to show to the caller
        message: String,
    },

    /// A referenced entity id does not exist
    #[error("{entity} {id} not found")]
    NotFound {
        /// Entity kind (e.g. "Order")
        entity: &'static str,
        /// Requested id
        id: i64,
    },

    /// A store uniqueness constraint or a concurrent writer rejected a write
    #[error("Conflict: {message}")]
    Conflict {
        /// Constraint detail reported by the store
        message: String,
    },

    /// Configuration could not be loaded or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Unclassified database failure
    #[error("Database error: {0}")]
    Database(DbErr),
}

/// Coarse classification used by the boundary adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 401
    AuthenticationRequired,
    /// 403
    AuthorizationDenied,
    /// 400
    ValidationFailed,
    /// 404
    NotFound,
    /// 409
    Conflict,
    /// 500
    Internal,
}

impl Error {
    /// Shorthand for a [`Error::Validation`] with the given message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Classifies this error for the boundary adapter.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::AuthenticationRequired => ErrorKind::AuthenticationRequired,
            Self::AuthorizationDenied { .. } => ErrorKind::AuthorizationDenied,
            Self::Validation { .. } => ErrorKind::ValidationFailed,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::Config { .. } | Self::Database(_) => ErrorKind::Internal,
        }
    }

    /// HTTP-like status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::AuthenticationRequired => 401,
            ErrorKind::AuthorizationDenied => 403,
            ErrorKind::ValidationFailed => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::Internal => 500,
        }
    }

    /// Re-surfaces a store uniqueness conflict as a validation failure with a
    /// domain message. Any other error passes through untouched.
    #[must_use]
    pub fn conflict_as_validation(self, message: &str) -> Self {
        match self {
            Self::Conflict { .. } => Self::validation(message),
            other => other,
        }
    }
}

// SQLite primary result codes; extended codes carry them in the low byte.
const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;

/// Whether the store refused a write because a concurrent transaction holds
/// the lock (`SQLITE_BUSY`, `SQLITE_LOCKED` and their extended codes).
fn is_lock_contention(err: &DbErr) -> bool {
    let runtime = match err {
        DbErr::Conn(e) | DbErr::Exec(e) | DbErr::Query(e) => e,
        _ => return false,
    };
    let RuntimeErr::SqlxError(sqlx::Error::Database(db_err)) = runtime else {
        return false;
    };
    db_err
        .code()
        .and_then(|code| code.parse::<i32>().ok())
        .is_some_and(|code| matches!(code & 0xff, SQLITE_BUSY | SQLITE_LOCKED))
}

impl From<DbErr> for Error {
    fn from(err: DbErr) -> Self {
        if let Some(SqlErr::UniqueConstraintViolation(message)) = err.sql_err() {
            return Self::Conflict { message };
        }
        if is_lock_contention(&err) {
            return Self::Conflict {
                message: err.to_string(),
            };
        }
        Self::Database(err)
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
