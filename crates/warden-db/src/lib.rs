//! # warden-db
//!
//! Store layer implementing the credential and reset-token traits.
//!
//! ## Overview
//!
//! Two backends are provided:
//!
//! - PostgreSQL via SQLx (`PgCredentialStore`, `PgResetTokenStore`), with
//!   pool management and schema bootstrap
//! - An in-process `MemoryStore` for local runs and tests
//!
//! ## Usage
//!
//! ```rust,ignore
//! use warden_db::pool::{create_pool, run_migrations, DatabaseConfig};
//! use warden_db::PgCredentialStore;
//! use warden_core::CredentialStore;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DatabaseConfig::new("postgres://localhost/warden", 10, 1);
//!     let pool = create_pool(&config).await?;
//!     run_migrations(&pool).await?;
//!     let users = PgCredentialStore::new(pool);
//!
//!     let total = users.count().await?;
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod memory;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use memory::MemoryStore;
pub use pool::{create_pool, run_migrations, DatabaseConfig, PgPool};
pub use repositories::{PgCredentialStore, PgResetTokenStore};
