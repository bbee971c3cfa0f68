//! Reset token entity <-> model mapper

use warden_core::{DomainError, ResetToken, User, UserId};

use super::user::parse_stored_role;
use crate::models::{ResetTokenModel, ResetTokenWithUserModel};

impl From<ResetTokenModel> for ResetToken {
    fn from(model: ResetTokenModel) -> Self {
        ResetToken {
            id: model.id,
            user_id: UserId::new(model.user_id),
            token: model.token,
            expires_at: model.expires_at,
            used: model.used,
            created_at: model.created_at,
        }
    }
}

/// Split a joined row into the token and its owner
pub fn token_with_owner(row: ResetTokenWithUserModel) -> Result<(ResetToken, User), DomainError> {
    let owner = User {
        id: UserId::new(row.token.user_id),
        username: row.owner_username,
        email: row.owner_email,
        password_hash: row.owner_password_hash,
        role: parse_stored_role(&row.owner_role)?,
    };
    Ok((ResetToken::from(row.token), owner))
}
