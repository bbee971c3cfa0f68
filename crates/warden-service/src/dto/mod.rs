//! Data transfer objects for API requests and responses
//!
//! This module provides:
//! - Request DTOs with validation for API inputs
//! - Response DTOs for serializing API outputs

pub mod requests;
pub mod responses;

// Re-export commonly used request types
pub use requests::{ForgotPasswordRequest, LoginRequest, NewAccount, ResetPasswordRequest};

// Re-export commonly used response types
pub use responses::{
    CurrentUserResponse, ForgotPasswordResponse, HealthChecks, HealthResponse, MessageResponse,
    ReadinessResponse, TokenResponse, FORGOT_PASSWORD_MESSAGE, RESET_SUCCESS_MESSAGE,
};
