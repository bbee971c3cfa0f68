//! User entity <-> model mapper

use warden_core::{DomainError, Role, User, UserId};

use crate::models::UserModel;

/// Parse a stored role, treating unknown values as corrupt data
pub(crate) fn parse_stored_role(role: &str) -> Result<Role, DomainError> {
    role.parse()
        .map_err(|_| DomainError::InternalError(format!("unknown role stored: {role}")))
}

/// Convert UserModel to User entity
impl TryFrom<UserModel> for User {
    type Error = DomainError;

    fn try_from(model: UserModel) -> Result<Self, Self::Error> {
        Ok(User {
            id: UserId::new(model.id),
            role: parse_stored_role(&model.role)?,
            username: model.username,
            email: model.email,
            password_hash: model.password_hash,
        })
    }
}
