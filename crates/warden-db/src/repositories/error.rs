//! Error handling utilities for repositories

use sqlx::Error as SqlxError;
use warden_core::{DomainError, UserId};

/// Convert SQLx error to DomainError
///
/// Connectivity problems surface as transient store errors so callers can
/// answer 503; everything else is an internal fault.
pub fn map_db_error(e: SqlxError) -> DomainError {
    match e {
        SqlxError::PoolTimedOut => DomainError::StoreTimeout,
        SqlxError::Io(_)
        | SqlxError::PoolClosed
        | SqlxError::Tls(_)
        | SqlxError::Protocol(_)
        | SqlxError::WorkerCrashed => DomainError::StoreUnavailable(e.to_string()),
        other => DomainError::InternalError(other.to_string()),
    }
}

/// Map a unique violation to the conflict matching the violated constraint
pub fn map_unique_violation(e: SqlxError) -> DomainError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return match db_err.constraint() {
                Some("users_username_key") => DomainError::UsernameAlreadyExists,
                Some("users_email_key") => DomainError::EmailAlreadyExists,
                Some("password_reset_tokens_token_key") => DomainError::ResetTokenExists,
                other => DomainError::InternalError(format!(
                    "unexpected unique violation on {}",
                    other.unwrap_or("<unnamed>")
                )),
            };
        }
    }
    map_db_error(e)
}

/// Create a "user not found" error
pub fn user_not_found(id: UserId) -> DomainError {
    DomainError::UserNotFound(id)
}
