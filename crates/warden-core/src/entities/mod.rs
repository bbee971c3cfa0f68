//! Domain entities - core business objects

mod reset_token;
mod role;
mod user;

pub use reset_token::{
    generate_reset_token, NewResetToken, ResetToken, ResetTokenState,
    DEFAULT_RESET_TOKEN_TTL_MINUTES, MAX_TOKEN_TTL_MINUTES,
    RESET_TOKEN_BYTES,
};
pub use role::Role;
pub use user::{normalize_email, normalize_username, NewUser, User};
