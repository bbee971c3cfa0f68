//! Account provisioning
//!
//! Creates accounts outside of any HTTP flow: administrative tooling and
//! the first-admin bootstrap at startup.

use tracing::{info, instrument};
use validator::Validate;
use warden_common::validate_password_strength;
use warden_core::{normalize_email, normalize_username, NewUser, Role, User};

use crate::dto::NewAccount;

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

pub const BOOTSTRAP_ADMIN_USERNAME: &str = "admin";
pub const BOOTSTRAP_ADMIN_EMAIL: &str = "admin@localhost";

/// Account provisioning service
pub struct ProvisioningService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ProvisioningService<'a> {
    /// Create a new ProvisioningService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Create an account with a hashed password
    ///
    /// Length and format rules apply to the username and email as stored,
    /// after trimming.
    #[instrument(skip(self, account), fields(username = %account.username, role = %account.role))]
    pub async fn create_user(&self, account: NewAccount) -> ServiceResult<User> {
        let account = NewAccount {
            username: normalize_username(&account.username),
            email: normalize_email(&account.email),
            ..account
        };
        account
            .validate()
            .map_err(|e| ServiceError::validation(e.to_string()))?;
        validate_password_strength(&account.password).map_err(ServiceError::from)?;

        let password_hash = self.ctx.hash_password(&account.password).await?;
        let new_user = NewUser::new(&account.username, &account.email, password_hash, account.role);

        let user = self
            .ctx
            .store_call(self.ctx.credential_store().create(&new_user))
            .await?;

        info!(user_id = %user.id, "User created");
        Ok(user)
    }

    /// Create the first admin account, only while the store holds no users
    #[instrument(skip_all)]
    pub async fn bootstrap_admin(&self, password: &str) -> ServiceResult<Option<User>> {
        let existing = self
            .ctx
            .store_call(self.ctx.credential_store().count())
            .await?;
        if existing > 0 {
            info!(existing, "Skipping admin bootstrap: store already has users");
            return Ok(None);
        }

        let admin = self
            .create_user(NewAccount {
                username: BOOTSTRAP_ADMIN_USERNAME.to_string(),
                email: BOOTSTRAP_ADMIN_EMAIL.to_string(),
                password: password.to_string(),
                role: Role::Admin,
            })
            .await?;

        Ok(Some(admin))
    }
}
