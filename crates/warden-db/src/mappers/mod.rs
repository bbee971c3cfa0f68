//! Entity to model mappers
//!
//! Conversions from database rows to domain objects.

mod reset_token;
mod user;

pub use reset_token::token_with_owner;
