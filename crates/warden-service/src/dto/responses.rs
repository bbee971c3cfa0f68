//! Response DTOs for API endpoints
//!
//! All response DTOs implement `Serialize` for JSON output.
//! User IDs are serialized as strings.

use chrono::{DateTime, Utc};
use serde::Serialize;
use warden_common::Claims;
use warden_core::{Role, UserId};

pub const FORGOT_PASSWORD_MESSAGE: &str = "If that email exists, a reset token has been issued.";
pub const RESET_SUCCESS_MESSAGE: &str = "Password has been reset successfully.";

// ============================================================================
// Auth Responses
// ============================================================================

/// Successful login
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Plain confirmation message
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Forgot-password acknowledgement
///
/// `reset_token` is only ever set when token echo is enabled.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset_token: Option<String>,
}

impl ForgotPasswordResponse {
    pub fn new(reset_token: Option<String>) -> Self {
        Self {
            message: FORGOT_PASSWORD_MESSAGE.to_string(),
            reset_token,
        }
    }
}

impl std::fmt::Debug for ForgotPasswordResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForgotPasswordResponse")
            .field("message", &self.message)
            .field("reset_token", &self.reset_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Identity carried by a bearer token
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUserResponse {
    pub id: UserId,
    pub username: String,
    pub role: Role,
    pub expires_at: DateTime<Utc>,
}

impl CurrentUserResponse {
    pub fn from_claims(claims: &Claims, id: UserId) -> Self {
        Self {
            id,
            username: claims.unique_name.clone(),
            role: claims.role,
            expires_at: claims.expires_at(),
        }
    }
}

// ============================================================================
// Health Responses
// ============================================================================

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checks: Option<HealthChecks>,
}

/// Individual health checks
#[derive(Debug, Serialize)]
pub struct HealthChecks {
    pub store: bool,
}

/// Readiness probe response
#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub checks: HealthChecks,
}
