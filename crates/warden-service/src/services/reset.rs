//! Password reset service
//!
//! Issues single-use, time-limited reset tokens and redeems them for a new
//! password. Token redemption is a compare-and-set in the store, so a token
//! can change a password at most once.

use chrono::Utc;
use tracing::{debug, info, instrument, warn};
use warden_common::validate_password_strength;
use warden_core::{normalize_email, NewResetToken};

use crate::dto::{
    ForgotPasswordRequest, ForgotPasswordResponse, MessageResponse, ResetPasswordRequest,
    RESET_SUCCESS_MESSAGE,
};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Password reset service
pub struct ResetTokenService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ResetTokenService<'a> {
    /// Create a new ResetTokenService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Issue a reset token for the account registered under `email`, if any.
    ///
    /// The response does not reveal whether the email is registered.
    #[instrument(skip(self, request))]
    pub async fn request_reset(
        &self,
        request: ForgotPasswordRequest,
    ) -> ServiceResult<ForgotPasswordResponse> {
        let email = normalize_email(&request.email);
        let user = self
            .ctx
            .store_call(self.ctx.credential_store().find_by_email(&email))
            .await?;

        let Some(user) = user else {
            debug!("Reset requested for unknown email");
            return Ok(ForgotPasswordResponse::new(None));
        };

        let settings = self.ctx.reset_settings();
        let issued = NewResetToken::issue(user.id, Utc::now(), settings.token_ttl)?;
        let stored = self
            .ctx
            .store_call(self.ctx.reset_store().insert(&issued))
            .await?;

        info!(
            user_id = %user.id,
            token_id = stored.id,
            expires_at = %stored.expires_at,
            "Reset token issued"
        );

        let echoed = settings.expose_token.then_some(stored.token);
        Ok(ForgotPasswordResponse::new(echoed))
    }

    /// Redeem a reset token and set a new password
    #[instrument(skip(self, request))]
    pub async fn reset(&self, request: ResetPasswordRequest) -> ServiceResult<MessageResponse> {
        validate_password_strength(&request.new_password).map_err(ServiceError::from)?;

        let found = self
            .ctx
            .store_call(self.ctx.reset_store().find_with_user(&request.token))
            .await?;

        let now = Utc::now();
        let (token, user) = match found {
            Some((token, user)) if token.is_consumable(now) => (token, user),
            Some((token, _)) => {
                warn!(token_id = token.id, state = ?token.state(now), "Reset rejected: token not usable");
                return Err(ServiceError::invalid_reset_token());
            }
            None => {
                warn!("Reset rejected: unknown token");
                return Err(ServiceError::invalid_reset_token());
            }
        };

        let new_hash = self.ctx.hash_password(&request.new_password).await?;

        // Hashing can take a while; expiry is checked again at the consume instant
        let consumed = self
            .ctx
            .store_call(self.ctx.reset_store().consume(token.id, user.id, &new_hash, Utc::now()))
            .await?;

        if !consumed {
            warn!(token_id = token.id, "Reset rejected: token consumed concurrently");
            return Err(ServiceError::invalid_reset_token());
        }

        info!(user_id = %user.id, token_id = token.id, "Password reset");
        Ok(MessageResponse::new(RESET_SUCCESS_MESSAGE))
    }
}
