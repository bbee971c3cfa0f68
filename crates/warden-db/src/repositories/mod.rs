//! PostgreSQL store implementations

mod credential;
mod error;
mod reset_token;

pub use credential::PgCredentialStore;
pub use error::{map_db_error, map_unique_violation};
pub use reset_token::PgResetTokenStore;
