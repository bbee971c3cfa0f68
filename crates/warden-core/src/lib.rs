//! # warden-core
//!
//! Domain layer containing users, reset tokens, value objects, and the store traits.
//! This crate has zero dependencies on infrastructure (database, web framework, etc.).

pub mod entities;
pub mod error;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    generate_reset_token, normalize_email, normalize_username, NewResetToken, NewUser,
    ResetToken, ResetTokenState, Role, User, DEFAULT_RESET_TOKEN_TTL_MINUTES, MAX_TOKEN_TTL_MINUTES,
    RESET_TOKEN_BYTES,
};
pub use error::DomainError;
pub use traits::{CredentialStore, RepoResult, ResetTokenStore};
pub use value_objects::{UserId, UserIdParseError};
