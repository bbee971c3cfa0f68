//! Authentication service
//!
//! Exchanges a username and password for a signed bearer token, and reads
//! the identity back out of one.

use chrono::Utc;
use tracing::{info, instrument, warn};
use warden_core::{normalize_username, User};

use crate::dto::{CurrentUserResponse, LoginRequest, TokenResponse};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Authentication service
pub struct AuthService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AuthService<'a> {
    /// Create a new AuthService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Login with username and password
    ///
    /// Unknown usernames and wrong passwords fail with the same error after
    /// the same amount of hashing work.
    #[instrument(skip(self, request), fields(username = %request.username))]
    pub async fn login(&self, request: LoginRequest) -> ServiceResult<TokenResponse> {
        let username = normalize_username(&request.username);
        let user = self
            .ctx
            .store_call(self.ctx.credential_store().find_by_username(&username))
            .await?;

        let verified = self
            .ctx
            .verify_password(&request.password, user.as_ref().map(|u| u.password_hash.as_str()))
            .await?;

        let user = match user {
            Some(user) if verified => user,
            Some(user) => {
                warn!(user_id = %user.id, "Login failed: invalid password");
                return Err(ServiceError::invalid_credentials());
            }
            None => {
                warn!("Login failed: unknown username");
                return Err(ServiceError::invalid_credentials());
            }
        };

        if self.ctx.password_needs_rehash(&user.password_hash) {
            self.upgrade_hash(&user, &request.password).await;
        }

        let issued = self
            .ctx
            .token_issuer()
            .issue(user.id, &user.username, user.role, Utc::now())
            .map_err(ServiceError::from)?;

        info!(user_id = %user.id, expires_at = %issued.expires_at, "User logged in successfully");

        Ok(TokenResponse {
            token: issued.token,
        })
    }

    /// Replace a hash made under an older work factor. Failures are logged
    /// and leave the old hash in place.
    async fn upgrade_hash(&self, user: &User, password: &str) {
        let upgraded = match self.ctx.hash_password(password).await {
            Ok(hash) => {
                self.ctx
                    .store_call(self.ctx.credential_store().update_password(user.id, &hash))
                    .await
            }
            Err(e) => Err(e),
        };

        match upgraded {
            Ok(()) => info!(user_id = %user.id, "Password hash upgraded to current work factor"),
            Err(e) => warn!(user_id = %user.id, error = %e, "Password hash upgrade failed"),
        }
    }

    /// Decode a bearer token into the identity it carries
    #[instrument(skip(self, token))]
    pub fn current_user(&self, token: &str) -> ServiceResult<CurrentUserResponse> {
        let claims = self
            .ctx
            .token_issuer()
            .decode(token)
            .map_err(ServiceError::from)?;
        let id = claims.user_id().map_err(ServiceError::from)?;

        Ok(CurrentUserResponse::from_claims(&claims, id))
    }
}
