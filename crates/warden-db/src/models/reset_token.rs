//! Password reset token database models

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for password_reset_tokens table
#[derive(Debug, Clone, FromRow)]
pub struct ResetTokenModel {
    pub id: i64,
    pub user_id: i64,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
    pub created_at: DateTime<Utc>,
}

/// A reset token row joined with its owning user
#[derive(Debug, Clone, FromRow)]
pub struct ResetTokenWithUserModel {
    #[sqlx(flatten)]
    pub token: ResetTokenModel,
    pub owner_username: String,
    pub owner_email: String,
    pub owner_password_hash: String,
    pub owner_role: String,
}
