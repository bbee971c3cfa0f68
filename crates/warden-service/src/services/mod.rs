//! Business logic services
//!
//! Service layer implementations that handle validation and orchestration
//! of the login, password reset and provisioning flows.

pub mod auth;
pub mod context;
pub mod error;
pub mod provision;
pub mod reset;

// Re-export all services for convenience
pub use auth::AuthService;
pub use context::{ResetSettings, ServiceContext, ServiceContextBuilder, DEFAULT_STORE_TIMEOUT};
pub use error::{ServiceError, ServiceResult};
pub use provision::{ProvisioningService, BOOTSTRAP_ADMIN_EMAIL, BOOTSTRAP_ADMIN_USERNAME};
pub use reset::ResetTokenService;
