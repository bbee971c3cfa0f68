//! Password reset token entity - a single-use, time-limited recovery grant

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Duration, Utc};
use rand::{rngs::OsRng, RngCore};

use crate::error::DomainError;
use crate::value_objects::UserId;

/// Random bytes behind every reset token
pub const RESET_TOKEN_BYTES: usize = 48;

/// Default validity window of a reset token
pub const DEFAULT_RESET_TOKEN_TTL_MINUTES: i64 = 30;

/// Longest validity window accepted for any issued token (one year)
pub const MAX_TOKEN_TTL_MINUTES: i64 = 525_600;

/// Lifecycle state of a reset token at a given instant.
///
/// `Expired` is derived from the clock; only `Consumed` is ever stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetTokenState {
    Active,
    Consumed,
    Expired,
}

/// Persisted reset token record
#[derive(Clone, PartialEq, Eq)]
pub struct ResetToken {
    pub id: i64,
    pub user_id: UserId,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
    pub created_at: DateTime<Utc>,
}

impl ResetToken {
    /// State of the token at `now`. A used token reports `Consumed` even once past expiry.
    pub fn state(&self, now: DateTime<Utc>) -> ResetTokenState {
        if self.used {
            ResetTokenState::Consumed
        } else if now >= self.expires_at {
            ResetTokenState::Expired
        } else {
            ResetTokenState::Active
        }
    }

    /// A token may be consumed iff it is unused and `now < expires_at`
    #[inline]
    pub fn is_consumable(&self, now: DateTime<Utc>) -> bool {
        self.state(now) == ResetTokenState::Active
    }
}

impl std::fmt::Debug for ResetToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResetToken")
            .field("id", &self.id)
            .field("user_id", &self.user_id)
            .field("expires_at", &self.expires_at)
            .field("used", &self.used)
            .finish_non_exhaustive()
    }
}

/// Reset token about to be persisted
#[derive(Clone)]
pub struct NewResetToken {
    pub user_id: UserId,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl NewResetToken {
    /// Issue a fresh random token for `user_id`, valid for `ttl` from `now`
    ///
    /// # Errors
    /// Returns `InternalError` if the expiry falls outside the representable range
    pub fn issue(user_id: UserId, now: DateTime<Utc>, ttl: Duration) -> Result<Self, DomainError> {
        let expires_at = now.checked_add_signed(ttl).ok_or_else(|| {
            DomainError::InternalError("reset token expiry out of range".to_string())
        })?;

        Ok(Self {
            user_id,
            token: generate_reset_token(),
            expires_at,
            created_at: now,
        })
    }
}

impl std::fmt::Debug for NewResetToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewResetToken")
            .field("user_id", &self.user_id)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

/// Generate an opaque reset token: 48 bytes from the OS CSPRNG, base64url without padding.
pub fn generate_reset_token() -> String {
    let mut bytes = [0u8; RESET_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
