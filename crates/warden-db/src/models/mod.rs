//! Database models - SQLx-compatible structs for PostgreSQL tables

mod reset_token;
mod user;

pub use reset_token::{ResetTokenModel, ResetTokenWithUserModel};
pub use user::UserModel;
