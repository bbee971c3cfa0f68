//! Authentication handlers
//!
//! Endpoints for login, the password reset flow, and the caller's identity.

use axum::{extract::State, Json};
use warden_service::dto::{
    CurrentUserResponse, ForgotPasswordRequest, ForgotPasswordResponse, LoginRequest,
    MessageResponse, ResetPasswordRequest, TokenResponse,
};
use warden_service::{AuthService, ResetTokenService};

use crate::extractors::{AuthUser, ValidatedJson};
use crate::response::ApiResult;
use crate::state::AppState;

/// Login with username and password
///
/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let service = AuthService::new(state.service_context());
    let response = service.login(request).await?;
    Ok(Json(response))
}

/// Request a password reset token
///
/// POST /api/auth/forgot-password
pub async fn forgot_password(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<ForgotPasswordRequest>,
) -> ApiResult<Json<ForgotPasswordResponse>> {
    let service = ResetTokenService::new(state.service_context());
    let response = service.request_reset(request).await?;
    Ok(Json(response))
}

/// Redeem a reset token for a new password
///
/// POST /api/auth/reset-password
pub async fn reset_password(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<ResetPasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let service = ResetTokenService::new(state.service_context());
    let response = service.reset(request).await?;
    Ok(Json(response))
}

/// Identity carried by the bearer token
///
/// GET /api/auth/me
pub async fn me(AuthUser(identity): AuthUser) -> Json<CurrentUserResponse> {
    Json(identity)
}
