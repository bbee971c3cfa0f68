//! # warden-service
//!
//! Application layer containing the login, password reset and provisioning
//! services, and the request/response DTOs.

pub mod dto;
pub mod services;

pub use services::{
    AuthService, ProvisioningService, ResetSettings, ResetTokenService, ServiceContext,
    ServiceContextBuilder, ServiceError, ServiceResult,
};
