//! Authentication primitives

mod jwt;
mod password;

pub use jwt::{Claims, IssuedToken, TokenIssuer, MIN_SECRET_LEN};
pub use password::{validate_password_strength, PasswordHasher};
