//! User entity - an account that can authenticate

use crate::entities::Role;
use crate::value_objects::UserId;

/// User account as held by the credential store
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    /// PHC-formatted argon2 hash, never plaintext
    pub password_hash: String,
    pub role: Role,
}

// Keeps the password hash out of logs and panic messages.
impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

/// Data required to create a user record
#[derive(Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

impl NewUser {
    /// Build a new user record, applying the identifier normalization policy
    pub fn new(username: &str, email: &str, password_hash: String, role: Role) -> Self {
        Self {
            username: normalize_username(username),
            email: normalize_email(email),
            password_hash,
            role,
        }
    }
}

impl std::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

/// Usernames are case-sensitive; only surrounding whitespace is dropped.
pub fn normalize_username(username: &str) -> String {
    username.trim().to_string()
}

/// Emails compare case-insensitively (ASCII), after trimming.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}
