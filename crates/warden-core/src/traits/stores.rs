//! Credential and reset-token store traits
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation (PostgreSQL or in-process).

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{NewResetToken, NewUser, ResetToken, User};
use crate::error::DomainError;
use crate::value_objects::UserId;

/// Result type for store operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// Credential Store
// ============================================================================

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Find user by username (exact match after normalization)
    async fn find_by_username(&self, username: &str) -> RepoResult<Option<User>>;

    /// Find user by email (case-insensitive)
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;

    /// Create a user; fails with a conflict error on duplicate username or email
    async fn create(&self, user: &NewUser) -> RepoResult<User>;

    /// Replace a user's stored password hash outside the reset flow, e.g.
    /// when a login upgrades a hash made under an older work factor.
    ///
    /// Reset redemption writes the hash through [`ResetTokenStore::consume`]
    /// so the token flip and the password change commit together.
    async fn update_password(&self, id: UserId, password_hash: &str) -> RepoResult<()>;

    /// Number of user records
    async fn count(&self) -> RepoResult<i64>;

    /// Cheap round trip used by readiness probes
    async fn ping(&self) -> RepoResult<()>;
}

// ============================================================================
// Reset Token Store
// ============================================================================

#[async_trait]
pub trait ResetTokenStore: Send + Sync {
    /// Persist a newly issued token
    async fn insert(&self, token: &NewResetToken) -> RepoResult<ResetToken>;

    /// Find a token by its opaque string, joined with the owning user
    async fn find_with_user(&self, token: &str) -> RepoResult<Option<(ResetToken, User)>>;

    /// Atomically consume a token and set the owner's new password hash.
    ///
    /// Flips `used` false -> true only while the token is unused and
    /// `expires_at > now`, and writes the password hash in the same
    /// transaction. Returns `false` when the token was no longer consumable,
    /// in which case nothing is written.
    async fn consume(
        &self,
        token_id: i64,
        user_id: UserId,
        new_password_hash: &str,
        now: DateTime<Utc>,
    ) -> RepoResult<bool>;
}
