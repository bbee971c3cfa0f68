//! # warden-common
//!
//! Shared utilities including configuration, error handling, password hashing,
//! bearer tokens, and telemetry.

pub mod auth;
pub mod config;
pub mod error;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use auth::{
    validate_password_strength, Claims, IssuedToken, PasswordHasher, TokenIssuer, MIN_SECRET_LEN,
};
pub use config::{
    AppConfig, AppSettings, ConfigError, CorsConfig, DatabaseConfig, Environment, JwtConfig,
    PasswordConfig, ResetConfig, ServerConfig, StoreBackend,
};
pub use error::{AppError, AppResult, ErrorResponse};
pub use telemetry::{try_init_tracing, try_init_tracing_with_config, TracingConfig, TracingError};
